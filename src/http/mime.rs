//! MIME type detection module
//!
//! Content types for the file kinds the data API lists, stores and exports.

/// Get MIME Content-Type based on file extension (case-insensitive)
///
/// # Examples
/// ```ignore
/// assert_eq!(get_content_type(Some("csv")), "text/csv; charset=utf-8");
/// assert_eq!(get_content_type(None), "application/octet-stream");
/// ```
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    let ext = extension.map(str::to_ascii_lowercase);
    match ext.as_deref() {
        // Spreadsheets
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("xlsm") => "application/vnd.ms-excel.sheet.macroEnabled.12",
        Some("xlsb") => "application/vnd.ms-excel.sheet.binary.macroEnabled.12",
        Some("xls") => "application/vnd.ms-excel",
        Some("ods") => "application/vnd.oasis.opendocument.spreadsheet",

        // Text
        Some("csv") => "text/csv; charset=utf-8",
        Some("txt" | "md") => "text/plain; charset=utf-8",
        Some("json") => "application/json",
        Some("html" | "htm") => "text/html; charset=utf-8",

        // Archives
        Some("zip") => "application/zip",

        // Default
        _ => "application/octet-stream",
    }
}
