use std::io::Write;

use tempfile::NamedTempFile;

/// Write `contents` to a fresh temporary file that lives as long as the
/// returned handle.
pub fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

/// Overwrite an existing temporary file.
pub fn rewrite(file: &NamedTempFile, contents: &str) {
    std::fs::write(file.path(), contents).expect("rewrite temp file");
}

pub fn rule_file(version: u64, region_factor: &str) -> String {
    format!(
        r#"
version = {version}

[[rules]]
id = "apr.base"
name = "staking_apr_base"
predicate = {{ kind = "always" }}
effect = {{ rate = "0.10" }}

[[rules]]
id = "region.any"
name = "region_multiplier"
predicate = {{ kind = "always" }}
effect = {{ multiplier = "{region_factor}" }}
"#
    )
}
