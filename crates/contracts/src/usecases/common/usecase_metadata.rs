/// Identification of a use case for logs and UI
pub trait UseCaseMetadata {
    /// Use case index (e.g. "u501")
    fn usecase_index() -> &'static str;

    /// Technical name (e.g. "bulk_upload")
    fn usecase_name() -> &'static str;

    /// Human-readable name
    fn display_name() -> &'static str;

    fn description() -> &'static str {
        ""
    }

    /// Full name in the form "u501_bulk_upload"
    fn full_name() -> String {
        format!("{}_{}", Self::usecase_index(), Self::usecase_name())
    }
}
