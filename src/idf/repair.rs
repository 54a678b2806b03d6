//! Post-serialization verification of inter-zone partner references.
//!
//! The legacy toolchain's model library corrupted the boundary-partner
//! field of inter-zone surfaces during its own save routine (overwriting it
//! with a self-reference), which forced a save-then-patch workaround. Our
//! serializer registers partner names before any record is written, so the
//! first pass is already correct — this module is kept as the documented
//! fallback: it re-reads the serialized text, confirms every expected
//! surface block is present, and patches any partner field that disagrees.
//! A missing block means the serializer and this pass have drifted apart,
//! which must fail loudly rather than be ignored.

use crate::error::ModelError;
use std::collections::HashMap;
use std::ops::Range;
use tracing::warn;

const SURFACE_KEYWORD: &str = "BuildingSurface:Detailed";
/// 0-based positional index of the boundary-partner field, keyword excluded:
/// Name, Type, Construction, Zone, Boundary Condition, Boundary Object.
const PARTNER_FIELD_INDEX: usize = 5;

/// Result of a verification pass over serialized model text.
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    pub text: String,
    /// Names of surfaces whose partner field had to be corrected.
    pub patched: Vec<String>,
}

/// One scanned record: keyword plus field values with their byte spans.
struct RawRecord {
    keyword: String,
    fields: Vec<(Range<usize>, String)>,
}

/// Scans record boundaries and field spans without altering the text.
fn scan_records(text: &str) -> Vec<RawRecord> {
    let bytes = text.as_bytes();
    let mut records = Vec::new();
    let mut fields: Vec<(Range<usize>, String)> = Vec::new();
    let mut field_start = 0usize;
    let mut in_comment = false;
    let mut comment_start = 0usize;
    // Portions masked out by comments within the current field.
    let mut masked: Vec<Range<usize>> = Vec::new();

    // Collects the field payload between two separators, skipping comment
    // ranges, and returns the byte span of the trimmed payload.
    let take_field = |start: usize,
                      end: usize,
                      masked: &mut Vec<Range<usize>>|
     -> (Range<usize>, String) {
        let mut segments: Vec<Range<usize>> = Vec::new();
        let mut pos = start;
        for m in masked.iter() {
            if m.start > pos {
                segments.push(pos..m.start);
            }
            pos = m.end.max(pos);
        }
        if end > pos {
            segments.push(pos..end);
        }
        masked.clear();

        let mut value = String::new();
        let mut span_start: Option<usize> = None;
        let mut span_end = start;
        for seg in &segments {
            let chunk = &text[seg.clone()];
            value.push_str(chunk);
            for (offset, ch) in chunk.char_indices() {
                if !ch.is_whitespace() {
                    let abs = seg.start + offset;
                    span_start.get_or_insert(abs);
                    span_end = abs + ch.len_utf8();
                }
            }
        }
        let span_start = span_start.unwrap_or(start);
        (span_start..span_end.max(span_start), value.trim().to_string())
    };

    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if in_comment {
            if c == '\n' {
                in_comment = false;
                masked.push(comment_start..i);
            }
            i += 1;
            continue;
        }
        match c {
            '!' => {
                in_comment = true;
                comment_start = i;
            }
            ',' | ';' => {
                fields.push(take_field(field_start, i, &mut masked));
                field_start = i + 1;
                if c == ';' {
                    let mut fs = std::mem::take(&mut fields);
                    let keyword = fs.remove(0).1;
                    records.push(RawRecord {
                        keyword,
                        fields: fs,
                    });
                }
            }
            _ => {}
        }
        i += 1;
    }
    records
}

/// Verifies every expected partner reference and patches disagreements.
///
/// `partners` maps inter-zone surface names to their expected boundary
/// partner, collected before serialization.
pub fn repair_surface_partners(
    text: &str,
    partners: &HashMap<String, String>,
) -> Result<RepairOutcome, ModelError> {
    let records = scan_records(text);
    let surfaces: HashMap<&str, &RawRecord> = records
        .iter()
        .filter(|r| r.keyword.eq_ignore_ascii_case(SURFACE_KEYWORD))
        .filter_map(|r| r.fields.first().map(|(_, name)| (name.as_str(), r)))
        .collect();

    // Collect edits first; apply back-to-front so spans stay valid.
    let mut edits: Vec<(Range<usize>, String, String)> = Vec::new();
    let mut names: Vec<&String> = partners.keys().collect();
    names.sort_unstable();
    for name in names {
        let expected = &partners[name];
        let record = surfaces
            .get(name.as_str())
            .ok_or_else(|| ModelError::MissingSurfaceBlock(name.clone()))?;
        let (span, actual) = record
            .fields
            .get(PARTNER_FIELD_INDEX)
            .ok_or_else(|| ModelError::MissingPartnerField { name: name.clone() })?;
        if actual != expected {
            edits.push((span.clone(), expected.clone(), name.clone()));
        }
    }

    let mut repaired = text.to_string();
    let mut patched = Vec::new();
    edits.sort_by_key(|(span, _, _)| span.start);
    for (span, expected, name) in edits.into_iter().rev() {
        warn!(surface = %name, partner = %expected, "patching corrupted partner reference");
        repaired.replace_range(span, &expected);
        patched.push(name);
    }
    patched.reverse();

    Ok(RepairOutcome {
        text: repaired,
        patched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_text() -> String {
        "\
BuildingSurface:Detailed,
  IntWall_North_Core_F1,      !- Name
  Wall,                       !- Surface Type
  Interior_Wall_Construction, !- Construction Name
  Perimeter_North_F1,         !- Zone Name
  Surface,                    !- Outside Boundary Condition
  IntWall_Core_North_F1,      !- Outside Boundary Condition Object
  NoSun,                      !- Sun Exposure
  NoWind,                     !- Wind Exposure
  autocalculate,              !- View Factor to Ground
  4;                          !- Number of Vertices

BuildingSurface:Detailed,
  IntWall_Core_North_F1,      !- Name
  Wall,                       !- Surface Type
  Interior_Wall_Construction, !- Construction Name
  Core_F1,                    !- Zone Name
  Surface,                    !- Outside Boundary Condition
  IntWall_Core_North_F1,      !- Outside Boundary Condition Object
  NoSun,                      !- Sun Exposure
  NoWind,                     !- Wind Exposure
  autocalculate,              !- View Factor to Ground
  4;                          !- Number of Vertices
"
        .to_string()
    }

    fn partner_map() -> HashMap<String, String> {
        HashMap::from([
            (
                "IntWall_North_Core_F1".to_string(),
                "IntWall_Core_North_F1".to_string(),
            ),
            (
                "IntWall_Core_North_F1".to_string(),
                "IntWall_North_Core_F1".to_string(),
            ),
        ])
    }

    #[test]
    fn test_patches_self_reference() {
        // The second block carries the classic corruption: it names itself
        // as its own boundary partner.
        let outcome = repair_surface_partners(&sample_text(), &partner_map()).unwrap();
        assert_eq!(outcome.patched, vec!["IntWall_Core_North_F1".to_string()]);

        let doc = crate::idf::object::IdfDocument::parse(&outcome.text).unwrap();
        let fixed = doc
            .find("BuildingSurface:Detailed", "IntWall_Core_North_F1")
            .unwrap();
        assert_eq!(fixed.field_value(5), Some("IntWall_North_Core_F1"));
        // The healthy block is untouched.
        let ok = doc
            .find("BuildingSurface:Detailed", "IntWall_North_Core_F1")
            .unwrap();
        assert_eq!(ok.field_value(5), Some("IntWall_Core_North_F1"));
    }

    #[test]
    fn test_clean_text_passes_unchanged() {
        // Heal only the second block's partner field; the first block carries
        // an identical line that must stay untouched.
        let bad = "  IntWall_Core_North_F1,      !- Outside Boundary Condition Object";
        let good = "  IntWall_North_Core_F1,      !- Outside Boundary Condition Object";
        let mut text = sample_text();
        let idx = text.rfind(bad).unwrap();
        text.replace_range(idx..idx + bad.len(), good);

        let outcome = repair_surface_partners(&text, &partner_map()).unwrap();
        assert!(outcome.patched.is_empty());
        assert_eq!(outcome.text, text);
    }

    #[test]
    fn test_missing_block_is_fatal() {
        let mut partners = partner_map();
        partners.insert("Ghost_Surface".to_string(), "Whatever".to_string());
        let err = repair_surface_partners(&sample_text(), &partners).unwrap_err();
        assert!(matches!(err, ModelError::MissingSurfaceBlock(name) if name == "Ghost_Surface"));
    }
}
