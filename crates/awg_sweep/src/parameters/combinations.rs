use super::{AwgParams, ParamField, ParameterSpace};

/// Holds all parameter variations to explore, with base values filled in.
pub(super) struct ParameterVariations {
    base: AwgParams,
    values: Vec<(ParamField, Vec<u32>)>,
}

impl ParameterVariations {
    pub(super) fn from_space(space: &ParameterSpace) -> Self {
        let values = ParamField::ALL
            .iter()
            .map(|&field| {
                let candidates = space.values(field);
                if candidates.is_empty() {
                    (field, vec![space.base.get(field)])
                } else {
                    (field, candidates.to_vec())
                }
            })
            .collect();

        Self {
            base: space.base,
            values,
        }
    }

    pub(super) fn candidates(&self, field: ParamField) -> &[u32] {
        self.values
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    pub(super) fn base(&self) -> AwgParams {
        self.base
    }

    /// Expands partial combinations one field at a time. Each existing
    /// partial is extended with every value of the next field, so earlier
    /// fields vary slower.
    pub(super) fn generate_combinations(&self) -> Vec<AwgParams> {
        let mut partial: Vec<AwgParams> = vec![self.base];

        for (field, values) in &self.values {
            let field = *field;
            partial = partial
                .iter()
                .flat_map(|params| values.iter().map(move |&value| params.with(field, value)))
                .collect();
        }

        partial
    }
}
