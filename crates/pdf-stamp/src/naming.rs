use crate::constants::{BARE_OUTPUT_SUFFIX, OUTPUT_SUFFIX};

/// Derive the output file name for a stamped document.
///
/// `report.pdf` becomes `report_rv.pdf`; a name without any `.` gets
/// `_checkmarks` appended instead.
pub fn output_name(original: &str) -> String {
    match original.rfind('.') {
        Some(dot) => format!(
            "{}{}{}",
            &original[..dot],
            OUTPUT_SUFFIX,
            &original[dot..]
        ),
        None => format!("{original}{BARE_OUTPUT_SUFFIX}"),
    }
}
