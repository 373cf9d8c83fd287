use super::*;

pub(crate) const HEADER_PREFIX_LEN: usize = 76;
pub(crate) const HEADER_LEN: usize = 80;

/// Reverses the bytes within each 4 byte word, preserving word order. This
/// is the transform between the wire form of prevhash and its block header
/// form, and it is its own inverse.
pub(crate) fn swap_each_word(bytes: [u8; 32]) -> [u8; 32] {
    let mut swapped = [0u8; 32];

    for (src, dst) in bytes.chunks_exact(4).zip(swapped.chunks_exact_mut(4)) {
        LittleEndian::write_u32(dst, BigEndian::read_u32(src));
    }

    swapped
}

/// The first 76 bytes of the block header: everything except the nonce.
/// The version, ntime and nbits words arrive as big-endian hex and go into
/// the header little-endian; prevhash is already word-swapped by its
/// parser; the merkle root is used as computed.
pub(crate) fn header_prefix(
    version: Version,
    prevhash: &PrevHash,
    merkle_root: &MerkleNode,
    ntime: Ntime,
    nbits: Nbits,
) -> [u8; HEADER_PREFIX_LEN] {
    let mut prefix = [0u8; HEADER_PREFIX_LEN];

    LittleEndian::write_u32(&mut prefix[0..4], version.into());
    prefix[4..36].copy_from_slice(prevhash.as_bytes());
    prefix[36..68].copy_from_slice(merkle_root.as_byte_array());
    LittleEndian::write_u32(&mut prefix[68..72], ntime.into());
    LittleEndian::write_u32(&mut prefix[72..76], nbits.into());

    prefix
}

/// The full 80 byte header for one nonce candidate, nonce packed
/// little-endian.
pub(crate) fn header(prefix: &[u8; HEADER_PREFIX_LEN], nonce: u32) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];

    header[..HEADER_PREFIX_LEN].copy_from_slice(prefix);
    LittleEndian::write_u32(&mut header[HEADER_PREFIX_LEN..], nonce);

    header
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    #[test]
    fn word_swap_is_an_involution() {
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = (i as u8).wrapping_mul(37).wrapping_add(11);
        }

        assert_ne!(swap_each_word(bytes), bytes);
        assert_eq!(swap_each_word(swap_each_word(bytes)), bytes);
    }

    #[test]
    fn block_123456_header() {
        // Canonical header for block 123,456 with its solving nonce.
        let version = "00000001".parse::<Version>().unwrap();
        let prevhash = "3ac400955224c625ad00510bf9b92cf824fd72dabc96a44700000b6000000000"
            .parse::<PrevHash>()
            .unwrap();
        let ntime = "4dcbc8a6".parse::<Ntime>().unwrap();
        let nbits = "1a6a93b3".parse::<Nbits>().unwrap();

        let mut merkle_bytes =
            <[u8; 32]>::try_from(
                hex::decode("0e60651a9934e8f0decd1c5fde39309e48fca0cd1c84a21ddfde95033762d86c")
                    .unwrap(),
            )
            .unwrap();
        merkle_bytes.reverse();
        let merkle_root = MerkleNode::from_byte_array(merkle_bytes);

        let prefix = header_prefix(version, &prevhash, &merkle_root, ntime, nbits);
        let full = header(&prefix, 0x913914e3);

        assert_eq!(
            hex::encode(full),
            "010000009500c43a25c624520b5100adf82cb9f9da72fd2447a496bc600b000000000000\
             6cd862370395dedf1da2841ccda0fc489e3039de5f1ccddef0e834991a65600e\
             a6c8cb4db3936a1ae3143991",
        );
    }
}
