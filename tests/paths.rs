use camino::{Utf8Path, Utf8PathBuf};

use kira_klifs::domain::{Entity, FileFormat, Layout, StructureLocator};
use kira_klifs::paths::{build_path, complex_mol2_path};

#[test]
fn flat_complex_without_alt_or_chain() {
    let locator = StructureLocator::new("hsa", "ABL1", "4u3y", "", "");
    assert_eq!(
        complex_mol2_path(Utf8Path::new("/x"), &locator),
        Utf8PathBuf::from("/x/HSA_ABL1_4u3y_complex.mol2")
    );
}

#[test]
fn nested_with_alternate_model() {
    let locator = StructureLocator::new("hsa", "ABL1", "4u3y", "A-", "");
    let path = build_path(
        Utf8Path::new("/x"),
        &locator,
        Entity::Complex,
        FileFormat::Mol2,
        Layout::Nested,
    );
    assert_eq!(
        path,
        Utf8PathBuf::from("/x/KLIFS_download/HSA/ABL1/4u3y_altA/complex.mol2")
    );
}

#[test]
fn nested_with_alt_and_chain_in_pdb() {
    let locator = StructureLocator::new("Human", "EGFR", "3w2s", "B", "A");
    let path = build_path(
        Utf8Path::new("data"),
        &locator,
        Entity::Complex,
        FileFormat::Pdb,
        Layout::Nested,
    );
    assert_eq!(
        path,
        Utf8PathBuf::from("data/KLIFS_download/HUMAN/EGFR/3w2s_altB_chainA/complex.pdb")
    );
}

#[test]
fn separator_placeholders_are_dropped() {
    let with_dashes = StructureLocator::new("hsa", "ABL1", "4u3y", "-", "-");
    let empty = StructureLocator::new("hsa", "ABL1", "4u3y", "", "");
    for layout in [Layout::Flat, Layout::Nested] {
        assert_eq!(
            build_path(Utf8Path::new("/x"), &with_dashes, Entity::Ligand, FileFormat::Mol2, layout),
            build_path(Utf8Path::new("/x"), &empty, Entity::Ligand, FileFormat::Mol2, layout)
        );
    }
}

#[test]
fn deterministic() {
    let locator = StructureLocator::new("mmu", "Akt1", "3cqw", "", "A");
    let first = build_path(Utf8Path::new("r"), &locator, Entity::Water, FileFormat::Mol2, Layout::Nested);
    let second = build_path(Utf8Path::new("r"), &locator, Entity::Water, FileFormat::Mol2, Layout::Nested);
    assert_eq!(first, second);
}
