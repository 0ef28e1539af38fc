//! The move catalog.
//!
//! `data/moves.ron` is validated and compiled by the build script into a
//! postcard blob plus a perfect-hash name index; this module decodes the blob
//! once and hands out `'static` references into it.

mod format_description;

pub use format_description::describe_move;

use crate::errors::{CatalogError, CatalogResult};
use schema::MoveData;
use std::sync::LazyLock;

include!(concat!(env!("OUT_DIR"), "/generated_data.rs"));

static MOVE_CATALOG: LazyLock<Vec<MoveData>> = LazyLock::new(|| {
    postcard::from_bytes(MOVE_CATALOG_BYTES)
        .unwrap_or_else(|err| panic!("compiled move catalog does not match the schema: {}", err))
});

/// Every move, in catalog order. The order is the tie-break order of weighted draws.
pub fn all_moves() -> &'static [MoveData] {
    MOVE_CATALOG.as_slice()
}

/// Looks a move up by its exact name.
pub fn get_move_data(name: &str) -> Option<&'static MoveData> {
    MOVE_INDEX
        .get(name)
        .and_then(|&index| MOVE_CATALOG.get(index))
}

pub fn try_get_move_data(name: &str) -> CatalogResult<&'static MoveData> {
    get_move_data(name).ok_or_else(|| CatalogError::MoveNotFound(name.to_string()))
}

/// Catalog entries whose names appear in `names`, kept in catalog order.
/// Unknown names are skipped.
pub fn moves_named<S: AsRef<str>>(names: &[S]) -> Vec<&'static MoveData> {
    all_moves()
        .iter()
        .filter(|move_data| names.iter().any(|name| name.as_ref() == move_data.name))
        .collect()
}

/// Catalog position of a move, used to sort names into catalog order.
pub fn catalog_position(name: &str) -> Option<usize> {
    MOVE_INDEX.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schema::{MoveEffect, MoveQuirk};

    #[test]
    fn catalog_keeps_file_order() {
        let names: Vec<&str> = all_moves().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "몸통박치기",
                "10만볼트",
                "파괴광선",
                "HP회복",
                "째려보기",
                "튀어오르기",
                "하이드로펌프",
                "방어",
                "맹독",
                "섀도볼",
                "리프레쉬",
            ]
        );
    }

    #[test]
    fn index_matches_catalog() {
        for (position, move_data) in all_moves().iter().enumerate() {
            assert_eq!(catalog_position(&move_data.name), Some(position));
            assert_eq!(get_move_data(&move_data.name), Some(move_data));
        }
    }

    #[test]
    fn lookups_resolve_payloads() {
        let hyper_beam = get_move_data("파괴광선").expect("hyper beam is in the catalog");
        assert_eq!(hyper_beam.damage, Some(120));
        assert!(hyper_beam.has_quirk(MoveQuirk::MustRecharge));

        let refresh = get_move_data("리프레쉬").expect("refresh is in the catalog");
        assert_eq!(refresh.effect, Some(MoveEffect::CureStatus));

        assert!(get_move_data("손가락흔들기").is_none());
        assert_eq!(
            try_get_move_data("손가락흔들기"),
            Err(CatalogError::MoveNotFound("손가락흔들기".to_string()))
        );
    }

    #[test]
    fn moves_named_uses_catalog_order_and_skips_unknowns() {
        let picked = moves_named(&["튀어오르기", "몸통박치기", "없는기술"]);
        let names: Vec<&str> = picked.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["몸통박치기", "튀어오르기"]);
    }
}
