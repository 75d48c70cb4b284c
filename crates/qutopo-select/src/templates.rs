//! Canonical kernel templates for blocks of 2 to 5 qudits.
//!
//! Every template is a fixed edge set over local vertices `0..blocksize`.
//! A [`Category`] names the family of templates the matcher may choose
//! from:
//!
//! ```text
//!  size 4                                  size 5
//!  line   0-1-2-3                          line    0-1-2-3-4
//!  star   0-{1,2,3}                        star    0-{1,2,3,4}
//!  ring   0-1-2-3-0                        tee     0-1-2, 1-3-4
//!  kite   line + (0,2)                     dipper  ring(0..4) + (0,4)
//!  theta  ring + (0,2)                     all     K5
//!  all    K4
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use qutopo_ir::Kernel;

use crate::error::{SelectError, SelectResult};

/// Largest block size with templates.
pub const MAX_BLOCKSIZE: usize = 5;

/// Shape of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    Line,
    Star,
    Ring,
    Kite,
    Theta,
    Tee,
    Dipper,
    All,
}

impl TemplateKind {
    /// Edge list of this shape at `blocksize`, if the shape exists there.
    pub fn edges(self, blocksize: usize) -> Option<&'static [(u32, u32)]> {
        let edges: &'static [(u32, u32)] = match (self, blocksize) {
            (_, 2) => &[(0, 1)],
            (Self::Line, 3) => &[(0, 1), (1, 2)],
            (Self::All, 3) => &[(0, 1), (0, 2), (1, 2)],
            (Self::Line, 4) => &[(0, 1), (1, 2), (2, 3)],
            (Self::Star, 4) => &[(0, 1), (0, 2), (0, 3)],
            (Self::Ring, 4) => &[(0, 1), (1, 2), (2, 3), (0, 3)],
            (Self::Kite, 4) => &[(0, 1), (1, 2), (2, 3), (0, 2)],
            (Self::Theta, 4) => &[(0, 1), (1, 2), (2, 3), (0, 3), (0, 2)],
            (Self::All, 4) => &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)],
            (Self::Line, 5) => &[(0, 1), (1, 2), (2, 3), (3, 4)],
            (Self::Star, 5) => &[(0, 1), (0, 2), (0, 3), (0, 4)],
            (Self::Tee, 5) => &[(0, 1), (1, 2), (1, 3), (3, 4)],
            (Self::Dipper, 5) => &[(0, 1), (1, 2), (2, 3), (0, 3), (0, 4)],
            (Self::All, 5) => &[
                (0, 1),
                (0, 2),
                (0, 3),
                (0, 4),
                (1, 2),
                (1, 3),
                (1, 4),
                (2, 3),
                (2, 4),
                (3, 4),
            ],
            _ => return None,
        };
        Some(edges)
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Line => "line",
            Self::Star => "star",
            Self::Ring => "ring",
            Self::Kite => "kite",
            Self::Theta => "theta",
            Self::Tee => "tee",
            Self::Dipper => "dipper",
            Self::All => "all",
        };
        write!(f, "{name}")
    }
}

/// A canonical kernel shape at a fixed block size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Shape.
    pub kind: TemplateKind,
    /// Number of vertices.
    pub blocksize: usize,
    /// Edges over `0..blocksize`.
    pub kernel: Kernel,
}

impl Template {
    fn of(kind: TemplateKind, blocksize: usize) -> Option<Self> {
        kind.edges(blocksize).map(|edges| Self {
            kind,
            blocksize,
            kernel: Kernel::from_pairs(edges.iter().copied()),
        })
    }

    /// Name such as `line_4`.
    pub fn name(&self) -> String {
        format!("{}_{}", self.kind, self.blocksize)
    }
}

/// Template family requested by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[serde(alias = "line")]
    Lines,
    #[serde(alias = "star")]
    Stars,
    #[serde(alias = "ring")]
    Rings,
    #[serde(alias = "kite")]
    Kites,
    #[serde(alias = "theta")]
    Thetas,
    #[serde(alias = "tee")]
    Tees,
    #[serde(alias = "dipper")]
    Dippers,
    #[serde(alias = "all")]
    Alls,
    /// Shapes realizable on a 2-D nearest-neighbour mesh.
    #[default]
    Embedded,
    /// Acyclic shapes.
    #[serde(alias = "tree")]
    Trees,
}

impl Category {
    /// All categories.
    pub const ALL: [Category; 10] = [
        Category::Lines,
        Category::Stars,
        Category::Rings,
        Category::Kites,
        Category::Thetas,
        Category::Tees,
        Category::Dippers,
        Category::Alls,
        Category::Embedded,
        Category::Trees,
    ];

    /// Configuration name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lines => "lines",
            Self::Stars => "stars",
            Self::Rings => "rings",
            Self::Kites => "kites",
            Self::Thetas => "thetas",
            Self::Tees => "tees",
            Self::Dippers => "dippers",
            Self::Alls => "alls",
            Self::Embedded => "embedded",
            Self::Trees => "trees",
        }
    }

    /// Template shapes of this family at `blocksize`, in match order.
    ///
    /// `None` when the family has nothing at that size.
    fn kinds(self, blocksize: usize) -> Option<&'static [TemplateKind]> {
        use TemplateKind as K;
        let kinds: &'static [TemplateKind] = match (blocksize, self) {
            (2, _) => &[K::Line],
            (3, Self::Alls) => &[K::All],
            (3, _) => &[K::Line],
            (4, Self::Lines) => &[K::Line],
            (4, Self::Stars) => &[K::Star],
            (4, Self::Rings) => &[K::Ring],
            (4, Self::Kites) => &[K::Kite],
            (4, Self::Thetas) => &[K::Theta],
            (4, Self::Alls) => &[K::All],
            (4, Self::Embedded) => &[K::Line, K::Star, K::Ring],
            (4, Self::Trees) => &[K::Line, K::Star],
            (5, Self::Lines) => &[K::Line],
            (5, Self::Stars) => &[K::Star],
            // Dippers at size 5 match with the tee shape.
            (5, Self::Tees | Self::Dippers) => &[K::Tee],
            (5, Self::Alls) => &[K::All],
            (5, Self::Embedded) => &[K::Line, K::Star, K::Tee, K::Dipper],
            (5, Self::Trees) => &[K::Line, K::Star, K::Tee],
            _ => return None,
        };
        Some(kinds)
    }

    /// Whether [`get_templates`] accepts this category at `blocksize`.
    pub fn is_available(self, blocksize: usize) -> bool {
        blocksize < 2 || self.kinds(blocksize).is_some()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = SelectError;

    fn from_str(s: &str) -> SelectResult<Self> {
        let name = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == name || c.as_str().strip_suffix('s') == Some(name.as_str()))
            .ok_or_else(|| SelectError::UnknownCategory(s.to_string()))
    }
}

/// Templates of `category` at `blocksize`, in match order.
///
/// Sizes below 2 yield nothing. Sizes above 5 and categories without a
/// shape at this size are configuration errors.
pub fn get_templates(category: Category, blocksize: usize) -> SelectResult<Vec<Template>> {
    if blocksize < 2 {
        return Ok(vec![]);
    }
    if blocksize > MAX_BLOCKSIZE {
        return Err(SelectError::UnsupportedBlockSize(blocksize));
    }
    let kinds = category
        .kinds(blocksize)
        .ok_or_else(|| SelectError::CategoryNotAvailable {
            category: category.to_string(),
            blocksize,
        })?;
    Ok(kinds
        .iter()
        .filter_map(|&kind| Template::of(kind, blocksize))
        .collect())
}

/// [`get_templates`] with the category given by name.
pub fn get_templates_by_name(category: &str, blocksize: usize) -> SelectResult<Vec<Template>> {
    get_templates(category.parse()?, blocksize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(category: Category, blocksize: usize) -> Vec<String> {
        get_templates(category, blocksize)
            .unwrap()
            .iter()
            .map(Template::name)
            .collect()
    }

    #[test]
    fn test_small_sizes() {
        assert!(get_templates(Category::Alls, 1).unwrap().is_empty());
        for category in Category::ALL {
            assert_eq!(names(category, 2), vec!["line_2"]);
        }
        assert_eq!(names(Category::Alls, 3), vec!["all_3"]);
        assert_eq!(names(Category::Rings, 3), vec!["line_3"]);
        assert_eq!(names(Category::Embedded, 3), vec!["line_3"]);
    }

    #[test]
    fn test_size_four_families() {
        assert_eq!(names(Category::Embedded, 4), vec!["line_4", "star_4", "ring_4"]);
        assert_eq!(names(Category::Trees, 4), vec!["line_4", "star_4"]);
        let kite = &get_templates(Category::Kites, 4).unwrap()[0];
        assert_eq!(kite.kernel, Kernel::from_pairs([(0, 1), (1, 2), (2, 3), (0, 2)]));
        let theta = &get_templates(Category::Thetas, 4).unwrap()[0];
        assert_eq!(theta.kernel.len(), 5);
        assert_eq!(get_templates(Category::Alls, 4).unwrap()[0].kernel.len(), 6);
    }

    #[test]
    fn test_size_five_families() {
        assert_eq!(
            names(Category::Embedded, 5),
            vec!["line_5", "star_5", "tee_5", "dipper_5"]
        );
        assert_eq!(names(Category::Trees, 5), vec!["line_5", "star_5", "tee_5"]);
        assert_eq!(names(Category::Dippers, 5), vec!["tee_5"]);
        assert_eq!(get_templates(Category::Alls, 5).unwrap()[0].kernel.len(), 10);
    }

    #[test]
    fn test_unavailable_and_unsupported() {
        assert!(matches!(
            get_templates(Category::Tees, 4),
            Err(SelectError::CategoryNotAvailable { blocksize: 4, .. })
        ));
        assert!(matches!(
            get_templates(Category::Rings, 5),
            Err(SelectError::CategoryNotAvailable { .. })
        ));
        assert!(matches!(
            get_templates(Category::Lines, 6),
            Err(SelectError::UnsupportedBlockSize(6))
        ));
        assert!(!Category::Kites.is_available(5));
        assert!(Category::Kites.is_available(3));
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("embedded".parse::<Category>().unwrap(), Category::Embedded);
        assert_eq!("Line".parse::<Category>().unwrap(), Category::Lines);
        assert_eq!("alls".parse::<Category>().unwrap(), Category::Alls);
        assert!(matches!(
            "hexagons".parse::<Category>(),
            Err(SelectError::UnknownCategory(_))
        ));
        assert!(get_templates_by_name("nope", 4).is_err());
    }

    #[test]
    fn test_every_template_fits() {
        for blocksize in 0..=MAX_BLOCKSIZE {
            for category in Category::ALL {
                if let Ok(templates) = get_templates(category, blocksize) {
                    for t in templates {
                        assert!(t.kernel.fits(blocksize), "{} does not fit", t.name());
                    }
                }
            }
        }
    }
}
