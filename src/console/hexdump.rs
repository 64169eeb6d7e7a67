// Hex dump formatting for the read command

const BYTES_PER_ROW: usize = 16;

/// Format `bytes` read from `address` as rows of
/// `0x81000000: 48 65 6c 6c 6f ...  |Hello...|`
pub fn hex_dump(address: u64, bytes: &[u8]) -> Vec<String> {
    bytes
        .chunks(BYTES_PER_ROW)
        .enumerate()
        .map(|(row, chunk)| {
            let row_addr = address.wrapping_add((row * BYTES_PER_ROW) as u64) & 0xFFFF_FFFF;
            let mut line = format!("0x{:08x}: ", row_addr);

            for i in 0..BYTES_PER_ROW {
                match chunk.get(i) {
                    Some(byte) => line.push_str(&format!("{:02x} ", byte)),
                    None => line.push_str("   "),
                }
            }

            line.push(' ');
            line.push('|');
            for &byte in chunk {
                if byte.is_ascii_graphic() || byte == b' ' {
                    line.push(byte as char);
                } else {
                    line.push('.');
                }
            }
            line.push('|');
            line
        })
        .collect()
}
