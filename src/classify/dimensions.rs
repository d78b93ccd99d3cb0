//! Pixel-dimension probing from image headers.
//!
//! Bounded magic-byte checks only; pixel content is never decoded. Callers
//! that already know an image's dimensions never need this.

fn png(data: &[u8]) -> Option<(u32, u32)> {
    const SIG: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    if data.len() < 24 || data[..8] != SIG || &data[12..16] != b"IHDR" {
        return None;
    }
    let w = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let h = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
    Some((w, h))
}

fn jpeg(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return None;
    }
    // Walk segments looking for a start-of-frame marker.
    let mut off = 2usize;
    while off + 9 < data.len() {
        if data[off] != 0xFF {
            return None;
        }
        let marker = data[off + 1];
        // Standalone markers without a length field.
        if (0xD0..=0xD9).contains(&marker) || marker == 0x01 {
            off += 2;
            continue;
        }
        let len = u16::from_be_bytes([data[off + 2], data[off + 3]]) as usize;
        if len < 2 {
            return None;
        }
        let is_sof = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            if off + 9 > data.len() {
                return None;
            }
            let h = u16::from_be_bytes([data[off + 5], data[off + 6]]);
            let w = u16::from_be_bytes([data[off + 7], data[off + 8]]);
            return Some((u32::from(w), u32::from(h)));
        }
        off += 2 + len;
    }
    None
}

fn gif(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 10 || &data[..4] != b"GIF8" {
        return None;
    }
    let w = u16::from_le_bytes([data[6], data[7]]);
    let h = u16::from_le_bytes([data[8], data[9]]);
    Some((u32::from(w), u32::from(h)))
}

fn bmp(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 26 || &data[..2] != b"BM" {
        return None;
    }
    let header = u32::from_le_bytes([data[14], data[15], data[16], data[17]]);
    if header < 40 {
        return None;
    }
    let w = i32::from_le_bytes([data[18], data[19], data[20], data[21]]);
    let h = i32::from_le_bytes([data[22], data[23], data[24], data[25]]);
    Some((w.unsigned_abs(), h.unsigned_abs()))
}

fn tga(data: &[u8]) -> Option<(u32, u32)> {
    // TGA has no magic; accept only coherent header fields.
    if data.len() < 18 {
        return None;
    }
    let colormap = data[1];
    let image_type = data[2];
    if colormap > 1 || !matches!(image_type, 1 | 2 | 3 | 9 | 10 | 11) {
        return None;
    }
    let w = u16::from_le_bytes([data[12], data[13]]);
    let h = u16::from_le_bytes([data[14], data[15]]);
    if w == 0 || h == 0 {
        return None;
    }
    Some((u32::from(w), u32::from(h)))
}

/// Probe pixel dimensions from the first bytes of an image file.
///
/// Recognizes PNG, JPEG, GIF, BMP, and (heuristically, last) TGA headers.
/// `None` means the dimensions could not be determined; the classifier then
/// types the image Unclassified instead of raising an error.
pub fn probe_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    png(data)
        .or_else(|| jpeg(data))
        .or_else(|| gif(data))
        .or_else(|| bmp(data))
        .or_else(|| tga(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_ihdr() {
        let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        data.extend_from_slice(&13u32.to_be_bytes());
        data.extend_from_slice(b"IHDR");
        data.extend_from_slice(&136u32.to_be_bytes());
        data.extend_from_slice(&188u32.to_be_bytes());
        assert_eq!(probe_dimensions(&data), Some((136, 188)));
    }

    #[test]
    fn test_jpeg_sof0() {
        // SOI, APP0 (minimal), SOF0 with 188x136.
        let mut data = vec![0xFF, 0xD8];
        data.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00]);
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
        data.extend_from_slice(&188u16.to_be_bytes());
        data.extend_from_slice(&136u16.to_be_bytes());
        data.extend_from_slice(&[0x03, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(probe_dimensions(&data), Some((136, 188)));
    }

    #[test]
    fn test_tga_header() {
        let mut data = vec![0u8; 18];
        data[2] = 2; // uncompressed true-color
        data[12..14].copy_from_slice(&24u16.to_le_bytes());
        data[14..16].copy_from_slice(&24u16.to_le_bytes());
        assert_eq!(probe_dimensions(&data), Some((24, 24)));
    }

    #[test]
    fn test_garbage_is_none() {
        assert_eq!(probe_dimensions(b"not an image at all"), None);
        assert_eq!(probe_dimensions(&[]), None);
    }
}
