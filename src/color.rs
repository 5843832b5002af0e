/// Background colors cycled through by course.
pub const PALETTE: [&str; 10] = [
    "#4f46e5", "#0891b2", "#059669", "#d97706", "#dc2626", "#7c3aed", "#db2777", "#2563eb",
    "#65a30d", "#ea580c",
];

/// Text color drawn on top of any palette entry.
pub const TEXT_COLOR: &str = "#ffffff";

/// Stable palette entry for a course, so it keeps its color across re-renders
/// without storing an assignment anywhere.
pub fn color_for(course_id: &str) -> &'static str {
    let sum = course_id
        .encode_utf16()
        .fold(0u64, |sum, unit| sum.wrapping_add(u64::from(unit)));

    PALETTE[(sum % PALETTE.len() as u64) as usize]
}
