pub mod rmsd;
pub mod sequence;
pub mod superpose;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::{AlignmentStage, KiraError};
use crate::structure::Structure;

pub use rmsd::rmsd;
pub use sequence::{NeedlemanWunsch, SequenceAligner, SequenceAlignment, SequenceScoring};
pub use superpose::{Kabsch, StructuralOverlap, Superposition};

#[derive(Debug, Clone, Serialize)]
pub struct Scores {
    pub rmsd: f64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlignerResult {
    pub superposed: (Structure, Structure),
    pub scores: Scores,
    pub metadata: Map<String, Value>,
}

pub trait Aligner {
    fn name(&self) -> &str;

    fn calculate(&self, structures: &[Structure]) -> Result<AlignerResult, KiraError>;
}

pub fn validate_pair(structures: &[Structure]) -> Result<(&Structure, &Structure), KiraError> {
    let [fixed, mobile] = structures else {
        return Err(KiraError::InvalidInput(format!(
            "expected exactly 2 structures, got {}",
            structures.len()
        )));
    };
    for structure in [fixed, mobile] {
        if structure.is_empty() {
            return Err(KiraError::InvalidInput(format!(
                "structure `{}` has no residues",
                structure.name
            )));
        }
    }
    Ok((fixed, mobile))
}

pub struct PipelineAligner<S, O> {
    name: String,
    sequence: S,
    overlap: O,
}

impl<S: SequenceAligner, O: StructuralOverlap> PipelineAligner<S, O> {
    pub fn new(name: impl Into<String>, sequence: S, overlap: O) -> Self {
        Self {
            name: name.into(),
            sequence,
            overlap,
        }
    }
}

pub fn kabsch_aligner(scoring: SequenceScoring) -> PipelineAligner<NeedlemanWunsch, Kabsch> {
    PipelineAligner::new("kabsch", NeedlemanWunsch::new(scoring), Kabsch::default())
}

impl<S: SequenceAligner, O: StructuralOverlap> Aligner for PipelineAligner<S, O> {
    fn name(&self) -> &str {
        &self.name
    }

    fn calculate(&self, structures: &[Structure]) -> Result<AlignerResult, KiraError> {
        let (fixed, mobile) = validate_pair(structures)?;

        let alignment = self
            .sequence
            .align(&fixed.sequence(), &mobile.sequence())
            .map_err(|err| AlignmentStage::SequenceAlignment.fail(err))?;

        let superposition = self
            .overlap
            .superpose(fixed, mobile, &alignment)
            .map_err(|err| AlignmentStage::StructuralOverlap.fail(err))?;

        let rmsd_before = rmsd(&superposition.fixed_points, &superposition.mobile_points)
            .map_err(|err| AlignmentStage::Scoring.fail(err))?;
        let rmsd_after = rmsd(&superposition.fixed_points, &superposition.moved_points)
            .map_err(|err| AlignmentStage::Scoring.fail(err))?;
        if !rmsd_after.is_finite() {
            return Err(AlignmentStage::Scoring.fail("RMSD is not a finite number"));
        }

        debug!(
            aligner = %self.name,
            fixed = %fixed.name,
            mobile = %mobile.name,
            rmsd_before,
            rmsd_after,
            "superposition finished"
        );

        let mut extra = BTreeMap::new();
        extra.insert("rmsd_before".to_string(), rmsd_before);
        extra.insert("sequence_identity".to_string(), alignment.identity());
        extra.insert(
            "aligned_pairs".to_string(),
            superposition.fixed_points.len() as f64,
        );

        let mut metadata = Map::new();
        metadata.insert("aligner".to_string(), json!(self.name));
        metadata.insert("alignment_score".to_string(), json!(alignment.score));
        metadata.insert(
            "gapped_sequences".to_string(),
            json!([alignment.gapped.0, alignment.gapped.1]),
        );
        metadata.insert("rotation".to_string(), json!(superposition.rotation));
        metadata.insert(
            "translation".to_string(),
            json!(superposition.translation.to_array()),
        );

        Ok(AlignerResult {
            superposed: superposition.superposed,
            scores: Scores {
                rmsd: rmsd_after,
                extra,
            },
            metadata,
        })
    }
}
