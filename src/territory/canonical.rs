//! Canonical expression text and the cache key derived from it
//!
//! Chains of the same commutative operator are flattened, sorted and
//! deduplicated, so `A | B`, `B | A` and `(A | B) | A` share one form.
//! Difference keeps its operand order.

use sha2::{Digest, Sha256};

use super::{LeafSource, Territory, TerritoryExpr};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Commutative {
    Union,
    Intersection,
}

impl Territory {
    pub fn canonical_form(&self) -> &str {
        self.canonical.get_or_init(|| self.build_canonical())
    }

    /// Truncated lowercase hex SHA-256 of the canonical form
    pub fn cache_key(&self, hex_len: usize) -> String {
        let mut key = sha256_hex(self.canonical_form().as_bytes());
        key.truncate(hex_len);
        key
    }

    fn build_canonical(&self) -> String {
        match &self.expr {
            TerritoryExpr::Leaf(LeafSource::ExternalKey(key)) => {
                format!("key:{}", serde_json::Value::String(key.clone()))
            }
            // serde_json objects are key-sorted, so the text is stable
            TerritoryExpr::Leaf(LeafSource::RawGeoJson(value)) => {
                format!("geojson:{}", sha256_hex(value.to_string().as_bytes()))
            }
            TerritoryExpr::Union(..) => self.flattened(Commutative::Union),
            TerritoryExpr::Intersection(..) => self.flattened(Commutative::Intersection),
            TerritoryExpr::Difference(a, b) => {
                format!("difference({},{})", a.canonical_form(), b.canonical_form())
            }
        }
    }

    fn flattened(&self, op: Commutative) -> String {
        let mut operands = Vec::new();
        self.collect_operands(op, &mut operands);
        operands.sort_unstable();
        operands.dedup();
        let name = match op {
            Commutative::Union => "union",
            Commutative::Intersection => "intersection",
        };
        format!("{name}({})", operands.join(","))
    }

    fn collect_operands<'a>(&'a self, op: Commutative, out: &mut Vec<&'a str>) {
        match (&self.expr, op) {
            (TerritoryExpr::Union(a, b), Commutative::Union)
            | (TerritoryExpr::Intersection(a, b), Commutative::Intersection) => {
                a.collect_operands(op, out);
                b.collect_operands(op, out);
            }
            _ => out.push(self.canonical_form()),
        }
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn k(name: &str) -> Territory {
        Territory::key(name)
    }

    #[test]
    fn test_union_is_order_insensitive() {
        let ab = k("A") | k("B");
        let ba = k("B") | k("A");
        assert_eq!(ab.canonical_form(), ba.canonical_form());
        assert_eq!(ab.cache_key(32), ba.cache_key(32));
    }

    #[test]
    fn test_union_is_grouping_insensitive() {
        let left = (k("A") | k("B")) | k("C");
        let right = k("C") | (k("B") | k("A"));
        assert_eq!(left.canonical_form(), right.canonical_form());
        assert_eq!(left.canonical_form(), r#"union(key:"A",key:"B",key:"C")"#);
    }

    #[test]
    fn test_difference_is_ordered() {
        let ab = k("A") - k("B");
        let ba = k("B") - k("A");
        assert_ne!(ab.canonical_form(), ba.canonical_form());
    }

    #[test]
    fn test_mixed_operators_not_flattened() {
        let a = (k("A") & k("B")) | k("C");
        let b = k("A") & (k("B") | k("C"));
        assert_ne!(a.canonical_form(), b.canonical_form());
    }

    #[test]
    fn test_geojson_leaf_ignores_member_order() {
        let a: serde_json::Value =
            serde_json::from_str(r#"{"type":"Polygon","coordinates":[]}"#).unwrap();
        let b: serde_json::Value =
            serde_json::from_str(r#"{"coordinates":[],"type":"Polygon"}"#).unwrap();
        assert_eq!(
            Territory::geojson(a).canonical_form(),
            Territory::geojson(b).canonical_form()
        );
        assert_ne!(
            Territory::geojson(json!({"type": "Polygon"})).canonical_form(),
            k("Polygon").canonical_form()
        );
    }

    #[test]
    fn test_cache_key_is_truncated_hex() {
        let key = k("A").cache_key(16);
        assert_eq!(key.len(), 16);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
