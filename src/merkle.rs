use {super::*, bitcoin::hashes::{Hash as _, sha256d::Hash as Sha256dHash}};

/// A node of the merkle tree in internal byte order. Stratum carries these
/// as straight hex, unlike the reversed hex Bitcoin uses to display txids.
#[derive(Copy, Clone, Debug, PartialEq, Eq, DeserializeFromStr, SerializeDisplay)]
pub struct MerkleNode(Sha256dHash);

impl MerkleNode {
    pub fn as_byte_array(&self) -> &[u8; 32] {
        self.0.as_byte_array()
    }

    pub fn from_byte_array(bytes: [u8; 32]) -> Self {
        Self(Sha256dHash::from_byte_array(bytes))
    }
}

impl FromStr for MerkleNode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ensure!(s.len() == 64, "merkle node hex must be 64 chars");

        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;

        Ok(Self::from_byte_array(bytes))
    }
}

impl Display for MerkleNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.as_byte_array()))
    }
}

/// Reassembles the coinbase transaction around the extranonces, hashes it,
/// and folds the merkle branches into the root. An empty branch list
/// yields the coinbase hash itself.
pub(crate) fn merkle_root(
    coinb1: &str,
    coinb2: &str,
    extranonce1: &Extranonce,
    extranonce2: &Extranonce,
    merkle_branches: &[MerkleNode],
) -> Result<MerkleNode> {
    let coinbase = hex::decode(format!("{coinb1}{extranonce1}{extranonce2}{coinb2}"))?;

    let mut root = sha256d(&coinbase);

    for branch in merkle_branches {
        let mut concat = [0u8; 64];
        concat[..32].copy_from_slice(&root);
        concat[32..].copy_from_slice(branch.as_byte_array());
        root = sha256d(&concat);
    }

    Ok(MerkleNode::from_byte_array(root))
}
