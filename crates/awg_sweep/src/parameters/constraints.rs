use super::AwgParams;

/// Returns false when the junk size window is empty or inverted.
pub(super) fn is_valid_jitter(params: &AwgParams) -> bool {
    params.jmax > params.jmin
}
