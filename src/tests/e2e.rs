//! End-to-end integration tests

use crate::packet::packer::ROW_PACKET_LEN;
use crate::tests::fixtures;
use crate::tests::validation::{
    header_erase_flag, page_display_text, row_display_text, validate_page, ValidationResult,
};
use crate::{
    EncodeOutput, EncodeWarning, EncodedPage, EncoderConfig, NationalCharset, Result,
    TeletextEncoder,
};

fn encode_line(enc: &mut TeletextEncoder, line: &str) -> Result<EncodeOutput> {
    let ctx = fixtures::split_context();
    let event = ctx.split_dialogue(line, None)?;
    enc.encode(&event, &ctx)
}

fn encode_one(
    config: EncoderConfig,
    text: &str,
) -> std::result::Result<(EncodedPage, Vec<EncodeWarning>), String> {
    let mut enc = TeletextEncoder::new(config).map_err(|e| e.to_string())?;
    let ctx = fixtures::split_context();
    let out = enc
        .encode(&fixtures::dialogue(0, 2000, text), &ctx)
        .map_err(|e| e.to_string())?;
    let page = out.page.ok_or_else(|| "no page emitted".to_string())?;
    Ok((page, out.warnings))
}

/// Drive scripted dialogue lines through one encoder and validate every
/// page on the wire
pub fn test_dialogue_lifecycle() -> ValidationResult {
    let mut enc = fixtures::encoder();
    let script = [
        (
            "Dialogue: 0,0:00:01.00,0:00:03.00,Default,,0,0,0,,First line",
            1000,
            3000,
        ),
        (
            r"Dialogue: 0,0:00:04.00,0:00:06.50,Emph,,0,0,0,,Second {\i1}styled{\i0} line",
            4000,
            6500,
        ),
        (
            "Dialogue: 0,0:00:07.00,0:00:09.00,Sign,,0,0,0,,TOP SIGN",
            7000,
            9000,
        ),
    ];

    for (i, (line, start_ms, end_ms)) in script.iter().enumerate() {
        let out = match encode_line(&mut enc, line) {
            Ok(out) => out,
            Err(e) => return ValidationResult::fail(format!("line {} failed: {}", i, e)),
        };
        let Some(page) = out.page else {
            return ValidationResult::fail(format!("line {} produced no page", i));
        };

        let result = validate_page(&page);
        if !result.is_valid {
            return result;
        }
        if page.start_ms != *start_ms || page.end_ms != *end_ms {
            return ValidationResult::fail(format!(
                "line {} timing {}..{}, want {}..{}",
                i, page.start_ms, page.end_ms, start_ms, end_ms
            ));
        }
        if page.subcode != i as u16 {
            return ValidationResult::fail(format!(
                "line {} subcode {}, want {}",
                i, page.subcode, i
            ));
        }
        if !header_erase_flag(&page) {
            return ValidationResult::fail(format!("line {} missing the erase bit", i));
        }
        // The top-anchored sign style must land on the first display row
        if i == 2 {
            match page.rows.get(1) {
                Some(row) if row.packet == 1 => {}
                Some(row) => {
                    return ValidationResult::fail(format!(
                        "top-anchored sign landed on packet {}",
                        row.packet
                    ))
                }
                None => {
                    return ValidationResult::fail("sign page has no display rows".to_string())
                }
            }
        }
    }

    if enc.subpage() != script.len() as u16 {
        return ValidationResult::fail(format!(
            "rotation counter at {}, want {}",
            enc.subpage(),
            script.len()
        ));
    }
    ValidationResult::success()
}

/// One styled line, checked byte for byte down to parity level
pub fn test_styled_page_bytes() -> ValidationResult {
    let mut enc = fixtures::encoder();
    let out = match encode_line(
        &mut enc,
        r"Dialogue: 0,0:00:00.50,0:00:02.50,Default,,0,0,0,,{\b1}HELLO{\b0} WORLD",
    ) {
        Ok(out) => out,
        Err(e) => return ValidationResult::fail(format!("encode failed: {}", e)),
    };
    let Some(page) = out.page else {
        return ValidationResult::fail("no page emitted".to_string());
    };
    let result = validate_page(&page);
    if !result.is_valid {
        return result;
    }

    if page.rows.len() != 2 {
        return ValidationResult::fail(format!(
            "expected header plus one row, got {} packets",
            page.rows.len()
        ));
    }
    let row = &page.rows[1];
    // Bottom anchor keeps a clear row below; double height reserves the
    // row above that
    if row.packet != 22 {
        return ValidationResult::fail(format!("text landed on packet {}", row.packet));
    }

    // Boxed double-height row opening with the emphasis colour switch
    let codes: Vec<u8> = row.data[4..8].iter().map(|b| b & 0x7F).collect();
    if codes != [0x0B, 0x0B, 0x0D, 0x03] {
        return ValidationResult::fail(format!("row opening codes {:02x?}", codes));
    }
    // 'H' carries its parity bit on the wire
    if row.data[8] != 0xC8 {
        return ValidationResult::fail(format!(
            "expected 0xC8 for 'H', got {:#04x}",
            row.data[8]
        ));
    }
    if row_display_text(row).trim() != "HELLO WORLD" {
        return ValidationResult::fail(format!(
            "display text {:?}",
            row_display_text(row).trim()
        ));
    }
    if page.to_bytes().len() != 2 * ROW_PACKET_LEN {
        return ValidationResult::fail("flattened page length mismatch".to_string());
    }
    ValidationResult::success()
}

/// Encode national text in matching and mismatching character sub-sets
pub fn test_charset_coverage() -> Vec<(&'static str, ValidationResult)> {
    let mut results = Vec::new();

    {
        let config = EncoderConfig {
            charset: NationalCharset::German,
            ..EncoderConfig::default()
        };
        let result = match encode_one(config, "Grüße West") {
            Ok((page, warnings)) if warnings.is_empty() => validate_page(&page),
            Ok((_, warnings)) => {
                ValidationResult::fail(format!("unexpected substitutions: {:?}", warnings))
            }
            Err(e) => ValidationResult::fail(e),
        };
        results.push(("german text in the german set", result));
    }

    {
        let result = match encode_one(EncoderConfig::default(), "Grüße") {
            Ok((page, warnings)) => {
                if warnings.len() != 2 {
                    ValidationResult::fail(format!(
                        "expected two substitutions, got {:?}",
                        warnings
                    ))
                } else if !page_display_text(&page).contains("Gr??e") {
                    ValidationResult::fail(format!(
                        "display text {:?}",
                        page_display_text(&page)
                    ))
                } else {
                    validate_page(&page)
                }
            }
            Err(e) => ValidationResult::fail(e),
        };
        results.push(("german text in the english set", result));
    }

    {
        let result = match encode_one(EncoderConfig::default(), "£9.99 only") {
            Ok((page, warnings)) if warnings.is_empty() => {
                if page_display_text(&page).contains("9.99") {
                    validate_page(&page)
                } else {
                    ValidationResult::fail("price text lost".to_string())
                }
            }
            Ok((_, warnings)) => {
                ValidationResult::fail(format!("pound sign substituted: {:?}", warnings))
            }
            Err(e) => ValidationResult::fail(e),
        };
        results.push(("national glyph in the english set", result));
    }

    results
}

/// Display, erase, display again: the erase page clears the screen
/// without consuming a rotation slot
pub fn test_display_erase_cycle() -> ValidationResult {
    let mut enc = fixtures::encoder();

    let first = match encode_line(
        &mut enc,
        "Dialogue: 0,0:00:01.00,0:00:03.00,Default,,0,0,0,,one",
    ) {
        Ok(out) => out,
        Err(e) => return ValidationResult::fail(format!("first encode failed: {}", e)),
    };
    let Some(first) = first.page else {
        return ValidationResult::fail("first event produced no page".to_string());
    };

    let erase = enc.encode_erase(3000);

    let second = match encode_line(
        &mut enc,
        "Dialogue: 0,0:00:04.00,0:00:06.00,Default,,0,0,0,,two",
    ) {
        Ok(out) => out,
        Err(e) => return ValidationResult::fail(format!("second encode failed: {}", e)),
    };
    let Some(second) = second.page else {
        return ValidationResult::fail("second event produced no page".to_string());
    };

    for page in [&first, &erase, &second] {
        let result = validate_page(page);
        if !result.is_valid {
            return result;
        }
        if !header_erase_flag(page) {
            return ValidationResult::fail("page missing the erase bit".to_string());
        }
    }

    if erase.rows.len() != 1 {
        return ValidationResult::fail(format!(
            "erase page carries {} packets, want the header alone",
            erase.rows.len()
        ));
    }
    if erase.start_ms != 3000 || erase.end_ms != 3000 {
        return ValidationResult::fail("erase page timing must collapse to its instant".to_string());
    }
    if first.subcode != 0 || erase.subcode != 1 || second.subcode != 1 {
        return ValidationResult::fail(format!(
            "rotation sequence {}, {}, {}; erase must not consume a slot",
            first.subcode, erase.subcode, second.subcode
        ));
    }
    ValidationResult::success()
}

/// More lines than the page has rows: truncated, warned, still conformant
pub fn test_row_overflow() -> ValidationResult {
    let config = EncoderConfig {
        rows: 4,
        double_height: false,
        ..EncoderConfig::default()
    };
    match encode_one(config, r"1\N2\N3\N4\N5\N6") {
        Ok((page, warnings)) => {
            if warnings != vec![EncodeWarning::RowOverflow { dropped_lines: 2 }] {
                return ValidationResult::fail(format!("warnings {:?}", warnings));
            }
            if page.rows.len() != 5 {
                return ValidationResult::fail(format!(
                    "expected 4 display rows, got {}",
                    page.rows.len() - 1
                ));
            }
            if page.rows.last().map(|r| r.packet) != Some(4) {
                return ValidationResult::fail("rows spill past the shortened page".to_string());
            }
            validate_page(&page)
        }
        Err(e) => ValidationResult::fail(e),
    }
}

/// Throughput benchmark over the full split and encode path
pub fn benchmark_encoding(iterations: usize) -> BenchmarkResult {
    use std::time::Instant;

    let ctx = fixtures::split_context();
    let mut enc = fixtures::encoder();
    let line = r"Dialogue: 0,0:00:01.00,0:00:03.00,Default,,0,0,0,,{\b1}Breaking:{\b0} long subtitle text\Nwrapping onto a second row";

    let start = Instant::now();
    for _ in 0..iterations {
        let event = ctx.split_dialogue(line, None).unwrap();
        let _ = enc.encode(&event, &ctx).unwrap();
    }
    let duration = start.elapsed();

    BenchmarkResult {
        name: "Split and encode",
        iterations,
        duration_ms: duration.as_millis() as u64,
        avg_us: (duration.as_micros() as f64 / iterations as f64) as u64,
    }
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub name: &'static str,
    pub iterations: usize,
    pub duration_ms: u64,
    pub avg_us: u64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} iterations in {}ms (avg: {}µs)",
            self.name, self.iterations, self.duration_ms, self.avg_us
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialogue_lifecycle_e2e() {
        let result = test_dialogue_lifecycle();
        assert!(
            result.is_valid,
            "dialogue lifecycle failed: {:?}",
            result.errors
        );
    }

    #[test]
    fn test_styled_page_bytes_e2e() {
        let result = test_styled_page_bytes();
        assert!(
            result.is_valid,
            "styled page bytes failed: {:?}",
            result.errors
        );
    }

    #[test]
    fn test_charset_coverage_all_sets() {
        for (name, result) in test_charset_coverage() {
            assert!(result.is_valid, "{} failed: {:?}", name, result.errors);
        }
    }

    #[test]
    fn test_display_erase_cycle_e2e() {
        let result = test_display_erase_cycle();
        assert!(
            result.is_valid,
            "display/erase cycle failed: {:?}",
            result.errors
        );
    }

    #[test]
    fn test_row_overflow_e2e() {
        let result = test_row_overflow();
        assert!(result.is_valid, "row overflow failed: {:?}", result.errors);
    }

    #[test]
    fn test_unterminated_tag_drops_event() {
        let mut enc = fixtures::encoder();
        let err = encode_line(
            &mut enc,
            r"Dialogue: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,{\b1broken",
        );
        assert!(err.is_err());
        assert_eq!(enc.subpage(), 0);
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encoder.toml");
        let config = EncoderConfig {
            magazine: 1,
            page: 0x50,
            charset: NationalCharset::Swedish,
            ..EncoderConfig::default()
        };

        config.to_file(path.to_str().unwrap()).unwrap();
        let loaded = EncoderConfig::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_benchmark_encoding() {
        let result = benchmark_encoding(200);
        println!("{}", result);
        // Per-event work is table lookups and a few small buffers
        assert!(
            result.avg_us < 2000,
            "encoding too slow: {}µs avg",
            result.avg_us
        );
    }
}
