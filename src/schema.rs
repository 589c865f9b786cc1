use std::collections::HashMap;
use std::sync::LazyLock;

use crate::domain::SourceTable;
use crate::error::KiraError;

const KLIFS_EXPORT: &[(&str, &str)] = &[
    ("NAME", "kinase.name"),
    ("FAMILY", "kinase.family"),
    ("GROUPS", "kinase.group"),
    ("PDB", "structure.pdb"),
    ("CHAIN", "structure.chain"),
    ("ALTERNATE_MODEL", "structure.alternate_model"),
    ("SPECIES", "species.klifs"),
    ("LIGAND", "ligand.name"),
    ("PDB_IDENTIFIER", "ligand.pdb"),
    ("ALLOSTERIC_NAME", "ligand.name_allosteric"),
    ("ALLOSTERIC_PDB", "ligand.pdb_allosteric"),
    ("DFG", "structure.dfg"),
    ("AC_HELIX", "structure.ac_helix"),
];

const KLIFS_OVERVIEW: &[(&str, &str)] = &[
    ("species", "species.klifs"),
    ("kinase", "kinase.name"),
    ("pdb", "structure.pdb"),
    ("alt", "structure.alternate_model"),
    ("chain", "structure.chain"),
    ("orthosteric_PDB", "ligand.pdb"),
    ("allosteric_PDB", "ligand.pdb_allosteric"),
    ("rmsd1", "structure.rmsd1"),
    ("rmsd2", "structure.rmsd2"),
    ("qualityscore", "structure.qualityscore"),
    ("pocket", "kinase.pocket"),
    ("resolution", "structure.resolution"),
    ("missing_residues", "structure.missing_residues"),
    ("missing_atoms", "structure.missing_atoms"),
    ("full_ifp", "interaction.fingerprint"),
    ("fp_i", "structure.fp_i"),
    ("fp_ii", "structure.fp_ii"),
    ("bp_i_a", "structure.bp_i_a"),
    ("bp_i_b", "structure.bp_i_b"),
    ("bp_ii_in", "structure.bp_ii_in"),
    ("bp_ii_a_in", "structure.bp_ii_a_in"),
    ("bp_ii_b_in", "structure.bp_ii_b_in"),
    ("bp_ii_out", "structure.bp_ii_out"),
    ("bp_ii_b", "structure.bp_ii_b"),
    ("bp_iii", "structure.bp_iii"),
    ("bp_iv", "structure.bp_iv"),
    ("bp_v", "structure.bp_v"),
];

const KINASES: &[(&str, &str)] = &[
    ("kinase_ID", "kinase.id"),
    ("name", "kinase.name"),
    ("HGNC", "kinase.hgnc"),
    ("family", "kinase.family"),
    ("group", "kinase.group"),
    ("kinase_class", "kinase.class"),
    ("species", "species.klifs"),
    ("full_name", "kinase.name_full"),
    ("uniprot", "kinase.uniprot"),
    ("iuphar", "kinase.iuphar"),
    ("pocket", "kinase.pocket"),
];

const STRUCTURES: &[(&str, &str)] = &[
    ("structure_ID", "structure.id"),
    ("kinase", "kinase.name"),
    ("species", "species.klifs"),
    ("kinase_ID", "kinase.id"),
    ("pdb", "structure.pdb"),
    ("alt", "structure.alternate_model"),
    ("chain", "structure.chain"),
    ("rmsd1", "structure.rmsd1"),
    ("rmsd2", "structure.rmsd2"),
    ("pocket", "kinase.pocket"),
    ("resolution", "structure.resolution"),
    ("quality_score", "structure.qualityscore"),
    ("missing_residues", "structure.missing_residues"),
    ("missing_atoms", "structure.missing_atoms"),
    ("ligand", "ligand.pdb"),
    ("allosteric_ligand", "ligand.pdb_allosteric"),
    ("DFG", "structure.dfg"),
    ("aC_helix", "structure.ac_helix"),
    ("Grich_distance", "structure.grich_distance"),
    ("Grich_angle", "structure.grich_angle"),
    ("Grich_rotation", "structure.grich_rotation"),
    ("front", "structure.front"),
    ("gate", "structure.gate"),
    ("back", "structure.back"),
    ("fp_I", "structure.fp_i"),
    ("fp_II", "structure.fp_ii"),
    ("bp_I_A", "structure.bp_i_a"),
    ("bp_I_B", "structure.bp_i_b"),
    ("bp_II_in", "structure.bp_ii_in"),
    ("bp_II_A_in", "structure.bp_ii_a_in"),
    ("bp_II_B_in", "structure.bp_ii_b_in"),
    ("bp_II_out", "structure.bp_ii_out"),
    ("bp_II_B", "structure.bp_ii_b"),
    ("bp_III", "structure.bp_iii"),
    ("bp_IV", "structure.bp_iv"),
    ("bp_V", "structure.bp_v"),
    // interactions_match_residues
    ("index", "structure.pocket_klifs_numbering"),
    ("Xray_position", "structure.pocket_pdb_numbering"),
    ("KLIFS_position", "structure.pocket_regions_klifs"),
];

const LIGANDS: &[(&str, &str)] = &[
    ("ligand_ID", "ligand.id"),
    ("PDB-code", "ligand.pdb"),
    ("Name", "ligand.name"),
    ("SMILES", "ligand.smiles"),
    ("InChIKey", "ligand.inchikey"),
];

const INTERACTIONS: &[(&str, &str)] = &[
    // interactions_get_types
    ("position", "interaction.id"),
    ("name", "interaction.name"),
    // interactions_get_IFP
    ("structure_ID", "structure.id"),
    ("IFP", "interaction.fingerprint"),
];

const BIOACTIVITIES: &[(&str, &str)] = &[
    ("pref_name", "kinase.pref_name"),
    ("accession", "kinase.uniprot"),
    ("organism", "species.chembl"),
    ("standard_type", "ligand.bioactivity_standard_type"),
    ("standard_relation", "ligand.bioactivity_standard_relation"),
    ("standard_value", "ligand.bioactivity_standard_value"),
    ("standard_units", "ligand.bioactivity_standard_units"),
    ("pchembl_value", "ligand.bioactivity_pchembl_value"),
];

pub const MOL2_COLUMNS_10: [&str; 10] = [
    "atom_id",
    "atom_name",
    "x",
    "y",
    "z",
    "atom_type",
    "subst_id",
    "subst_name",
    "charge",
    "backbone",
];

pub const MOL2_COLUMNS_9: [&str; 9] = [
    "atom_id",
    "atom_name",
    "x",
    "y",
    "z",
    "atom_type",
    "subst_id",
    "subst_name",
    "charge",
];

static MAPPINGS: LazyLock<HashMap<SourceTable, HashMap<&'static str, &'static str>>> =
    LazyLock::new(|| {
        SourceTable::ALL
            .into_iter()
            .map(|table| (table, entries(table).iter().copied().collect()))
            .collect()
    });

fn entries(source: SourceTable) -> &'static [(&'static str, &'static str)] {
    match source {
        SourceTable::KlifsExport => KLIFS_EXPORT,
        SourceTable::KlifsOverview => KLIFS_OVERVIEW,
        SourceTable::Kinases => KINASES,
        SourceTable::Structures => STRUCTURES,
        SourceTable::Ligands => LIGANDS,
        SourceTable::Interactions => INTERACTIONS,
        SourceTable::Bioactivities => BIOACTIVITIES,
    }
}

pub fn canonical_name(source: SourceTable, raw: &str) -> Result<&'static str, KiraError> {
    MAPPINGS
        .get(&source)
        .and_then(|mapping| mapping.get(raw))
        .copied()
        .ok_or_else(|| KiraError::UnknownField {
            source_table: source,
            field: raw.to_string(),
        })
}

pub fn columns(source: SourceTable) -> Vec<&'static str> {
    entries(source).iter().map(|(raw, _)| *raw).collect()
}
