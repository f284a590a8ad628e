//! ToUnicode CMap support
//!
//! Arabic text in PDFs is almost always set in CID-keyed (Type0) fonts whose
//! glyph codes only become Unicode through the font's ToUnicode CMap.

use flate2::read::ZlibDecoder;
use lopdf::{Dictionary, Document, Object};
use std::collections::{BTreeMap, HashMap};
use std::io::Read;

/// A parsed ToUnicode CMap
#[derive(Debug, Default, Clone)]
pub struct ToUnicodeCMap {
    /// Direct code -> Unicode mappings
    pub char_map: HashMap<u16, String>,
    /// (start_code, end_code, base_codepoint)
    pub ranges: Vec<(u16, u16, u32)>,
}

impl ToUnicodeCMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a CMap from its decompressed content
    pub fn parse(content: &[u8]) -> Option<Self> {
        let text = String::from_utf8_lossy(content);
        let mut cmap = ToUnicodeCMap::new();

        for section in sections(&text, "beginbfchar", "endbfchar") {
            cmap.parse_bfchar_section(section);
        }
        for section in sections(&text, "beginbfrange", "endbfrange") {
            cmap.parse_bfrange_section(section);
        }

        if cmap.char_map.is_empty() && cmap.ranges.is_empty() {
            None
        } else {
            Some(cmap)
        }
    }

    /// `<src> <dst>` pairs
    fn parse_bfchar_section(&mut self, section: &str) {
        let tokens = tokenize(section);
        for pair in tokens.chunks_exact(2) {
            if let (Token::Hex(src), Token::Hex(dst)) = (&pair[0], &pair[1]) {
                if let (Some(code), Some(unicode)) = (parse_hex_u16(src), hex_to_unicode_string(dst))
                {
                    self.char_map.insert(code, unicode);
                }
            }
        }
    }

    /// `<start> <end> <base>` or `<start> <end> [<dst> ...]` triplets
    fn parse_bfrange_section(&mut self, section: &str) {
        let tokens = tokenize(section);
        let mut i = 0;
        while i + 2 < tokens.len() {
            let (Token::Hex(start), Token::Hex(end)) = (&tokens[i], &tokens[i + 1]) else {
                i += 1;
                continue;
            };
            let (Some(start), Some(end)) = (parse_hex_u16(start), parse_hex_u16(end)) else {
                i += 3;
                continue;
            };

            match &tokens[i + 2] {
                Token::Hex(base) => {
                    if let Some(base) = parse_hex_u32(base) {
                        self.ranges.push((start, end, base));
                    }
                }
                Token::Array(targets) => {
                    for (code, target) in (start..=end).zip(targets) {
                        if let Some(unicode) = hex_to_unicode_string(target) {
                            self.char_map.insert(code, unicode);
                        }
                    }
                }
            }
            i += 3;
        }
    }

    /// Look up a code
    pub fn lookup(&self, code: u16) -> Option<String> {
        if let Some(s) = self.char_map.get(&code) {
            return Some(s.clone());
        }

        self.ranges
            .iter()
            .find(|&&(start, end, _)| code >= start && code <= end)
            .and_then(|&(start, _, base)| base.checked_add((code - start) as u32))
            .and_then(char::from_u32)
            .map(|c| c.to_string())
    }

    /// Decode 2-byte big-endian CIDs
    pub fn decode_cids(&self, bytes: &[u8]) -> String {
        let mut result = String::new();
        for chunk in bytes.chunks_exact(2) {
            let cid = u16::from_be_bytes([chunk[0], chunk[1]]);
            if let Some(s) = self.lookup(cid) {
                result.push_str(&s);
            } else if let Some(c) = char::from_u32(cid as u32) {
                result.push(c);
            }
        }
        result
    }

    /// Decode single-byte codes (simple fonts carrying a ToUnicode map)
    pub fn decode_bytes(&self, bytes: &[u8]) -> String {
        bytes
            .iter()
            .map(|&b| self.lookup(b as u16).unwrap_or_else(|| (b as char).to_string()))
            .collect()
    }
}

/// How the text operands of one font resource are turned into Unicode
#[derive(Debug, Clone)]
pub struct FontDecoder {
    pub cmap: ToUnicodeCMap,
    /// Type0 fonts use 2-byte codes
    pub two_byte: bool,
}

impl FontDecoder {
    pub fn decode(&self, bytes: &[u8]) -> String {
        if self.two_byte {
            self.cmap.decode_cids(bytes)
        } else {
            self.cmap.decode_bytes(bytes)
        }
    }
}

/// Build decoders for every page font that carries a ToUnicode map, keyed by
/// resource name
pub fn font_decoders(
    doc: &Document,
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
) -> HashMap<Vec<u8>, FontDecoder> {
    let mut decoders = HashMap::new();

    for (name, font) in fonts {
        let Some(content) = tounicode_stream(doc, font) else {
            continue;
        };
        match ToUnicodeCMap::parse(&content) {
            Some(cmap) => {
                let two_byte = font
                    .get(b"Subtype")
                    .and_then(Object::as_name)
                    .map_or(false, |s| s == b"Type0");
                decoders.insert(name.clone(), FontDecoder { cmap, two_byte });
            }
            None => log::debug!(
                "ToUnicode map for font {} has no mappings",
                String::from_utf8_lossy(name)
            ),
        }
    }

    decoders
}

/// Decompressed ToUnicode stream of a font dictionary
fn tounicode_stream(doc: &Document, font: &Dictionary) -> Option<Vec<u8>> {
    let reference = font.get(b"ToUnicode").ok()?.as_reference().ok()?;
    let stream = doc.get_object(reference).ok()?.as_stream().ok()?;

    match stream.decompressed_content() {
        Ok(data) => Some(data),
        Err(e) => {
            // lopdf refuses some streams with trailing garbage; zlib is more lenient
            log::warn!("lopdf could not decompress ToUnicode {:?}: {}", reference, e);
            inflate_lenient(&stream.content).or_else(|| Some(stream.content.clone()))
        }
    }
}

/// Inflate as much of a zlib stream as possible
pub fn inflate_lenient(data: &[u8]) -> Option<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    match decoder.read_to_end(&mut out) {
        Ok(_) => Some(out),
        Err(_) if !out.is_empty() => Some(out),
        Err(_) => None,
    }
}

enum Token<'a> {
    Hex(&'a str),
    Array(Vec<&'a str>),
}

/// Hex strings and arrays of hex strings; everything else is skipped
fn tokenize(section: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = section;
    let mut array: Option<Vec<&str>> = None;

    while let Some(pos) = rest.find(|c: char| matches!(c, '<' | '[' | ']')) {
        match rest.as_bytes()[pos] {
            b'[' => {
                array = Some(Vec::new());
                rest = &rest[pos + 1..];
            }
            b']' => {
                if let Some(items) = array.take() {
                    tokens.push(Token::Array(items));
                }
                rest = &rest[pos + 1..];
            }
            _ => {
                let Some(len) = rest[pos + 1..].find('>') else {
                    break;
                };
                let hex = &rest[pos + 1..pos + 1 + len];
                match array.as_mut() {
                    Some(items) => items.push(hex),
                    None => tokens.push(Token::Hex(hex)),
                }
                rest = &rest[pos + 2 + len..];
            }
        }
    }

    tokens
}

/// Bodies between each begin/end keyword pair
fn sections<'a>(text: &'a str, begin: &str, end: &str) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut pos = 0;
    while let Some(start) = text[pos..].find(begin) {
        let body_start = pos + start + begin.len();
        let Some(len) = text[body_start..].find(end) else {
            break;
        };
        out.push(&text[body_start..body_start + len]);
        pos = body_start + len + end.len();
    }
    out
}

fn parse_hex_u16(hex: &str) -> Option<u16> {
    u16::from_str_radix(hex.trim(), 16).ok()
}

fn parse_hex_u32(hex: &str) -> Option<u32> {
    u32::from_str_radix(hex.trim(), 16).ok()
}

/// UTF-16BE hex to a Unicode string, surrogate pairs included
fn hex_to_unicode_string(hex: &str) -> Option<String> {
    let hex: String = hex.chars().filter(|c| !c.is_whitespace()).collect();
    let units: Vec<u16> = hex
        .as_bytes()
        .chunks_exact(4)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .filter_map(|s| u16::from_str_radix(s, 16).ok())
        .collect();

    let result: String = char::decode_utf16(units)
        .filter_map(Result::ok)
        .collect();

    if result.is_empty() {
        None
    } else {
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bfchar() {
        let cmap_content = r#"
/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
1 begincodespacerange
<0000><FFFF>
endcodespacerange
3 beginbfchar
<0003> <0020>
<0024> <0041>
<01A2> <0627>
endbfchar
endcmap
"#;
        let cmap = ToUnicodeCMap::parse(cmap_content.as_bytes()).unwrap();

        assert_eq!(cmap.lookup(0x0003), Some(" ".to_string()));
        assert_eq!(cmap.lookup(0x0024), Some("A".to_string()));
        assert_eq!(cmap.lookup(0x01A2), Some("\u{0627}".to_string()));
        assert_eq!(cmap.lookup(0x0025), None);
    }

    #[test]
    fn test_parse_bfrange_base_and_array() {
        let cmap_content = r#"
2 beginbfrange
<0010> <0012> <0628>
<0020> <0021> [<0644> <06440627>]
endbfrange
"#;
        let cmap = ToUnicodeCMap::parse(cmap_content.as_bytes()).unwrap();

        assert_eq!(cmap.lookup(0x0010), Some("\u{0628}".to_string()));
        assert_eq!(cmap.lookup(0x0012), Some("\u{062A}".to_string()));
        assert_eq!(cmap.lookup(0x0020), Some("\u{0644}".to_string()));
        // lam-alef ligature maps to two code points
        assert_eq!(cmap.lookup(0x0021), Some("\u{0644}\u{0627}".to_string()));
    }

    #[test]
    fn test_bfrange_base_near_u32_max_is_dropped() {
        let cmap = ToUnicodeCMap::parse(b"1 beginbfrange\n<0000> <0010> <FFFFFFFE>\nendbfrange")
            .unwrap();
        assert_eq!(cmap.lookup(0x0000), None);
        assert_eq!(cmap.lookup(0x0005), None);
        assert_eq!(cmap.decode_cids(&[0x00, 0x05]), "\u{5}");
    }

    #[test]
    fn test_decode_cids() {
        let cmap_content = r#"
3 beginbfchar
<0003> <0020>
<0024> <0041>
<0025> <0042>
endbfchar
"#;
        let cmap = ToUnicodeCMap::parse(cmap_content.as_bytes()).unwrap();

        let cids = [0x00, 0x24, 0x00, 0x25, 0x00, 0x03];
        assert_eq!(cmap.decode_cids(&cids), "AB ");
    }

    #[test]
    fn test_decode_single_bytes() {
        let cmap = ToUnicodeCMap::parse(b"1 beginbfchar\n<41> <0628>\nendbfchar").unwrap();
        let decoder = FontDecoder {
            cmap,
            two_byte: false,
        };
        assert_eq!(decoder.decode(b"AB"), "\u{0628}B");
    }

    #[test]
    fn test_surrogate_pair_target() {
        assert_eq!(hex_to_unicode_string("D835DC00"), Some("\u{1D400}".to_string()));
    }

    #[test]
    fn test_empty_cmap_is_none() {
        assert!(ToUnicodeCMap::parse(b"begincmap endcmap").is_none());
    }

    #[test]
    fn test_inflate_lenient() {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        use std::io::Write;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"1 beginbfchar <01> <0627> endbfchar").unwrap();
        let compressed = encoder.finish().unwrap();

        let inflated = inflate_lenient(&compressed).unwrap();
        assert_eq!(inflated, b"1 beginbfchar <01> <0627> endbfchar");
        assert!(inflate_lenient(b"not zlib").is_none());
    }
}
