//! Shared helpers for integration tests: in-memory archive construction.

/// Assemble a descriptor container: 32-byte big-endian header (total size,
/// payload size, relocation count, root count), payload, empty relocation
/// table, root-node table, NUL-terminated string table.
pub fn build_container(payload: &[u8], symbols: &[&str]) -> Vec<u8> {
    const HEADER_SIZE: usize = 32;
    const ROOT_ENTRY: usize = 8;

    let mut strings = Vec::new();
    let mut offsets = Vec::new();
    for s in symbols {
        offsets.push(strings.len() as u32);
        strings.extend_from_slice(s.as_bytes());
        strings.push(0);
    }

    let root_count = symbols.len() as u32;
    let total = HEADER_SIZE + payload.len() + root_count as usize * ROOT_ENTRY + strings.len();

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&(total as u32).to_be_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(&root_count.to_be_bytes());
    out.extend_from_slice(&[0u8; 16]);
    out.extend_from_slice(payload);
    for off in offsets {
        out.extend_from_slice(&0u32.to_be_bytes());
        out.extend_from_slice(&off.to_be_bytes());
    }
    out.extend_from_slice(&strings);
    out
}

/// Minimal PNG holding only a signature and IHDR, enough for the
/// dimension prober.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data
}
