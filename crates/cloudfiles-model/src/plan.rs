//! Upload plans and segment naming.
//!
//! A plan is immutable once built. Segment names depend only on the object
//! name and the segment index, so re-planning the same request always
//! targets the same segment objects.

use std::ops::Range;

use cloudfiles_core::ObjectName;

/// Digits used for the zero-padded segment index.
///
/// Dynamic manifests concatenate segments in lexicographic listing order,
/// so the index must sort the same way as a string and as a number.
const SEGMENT_INDEX_WIDTH: usize = 8;

/// Infix between the object name and the segment index.
const SEGMENT_INFIX: &str = "/part-";

/// One contiguous byte range of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// 0-based position within the plan.
    pub index: usize,
    /// Offset of the first byte within the source.
    pub offset: u64,
    /// Number of bytes.
    pub length: u64,
    /// Name of the object this range is stored under.
    pub name: String,
}

impl Part {
    /// Byte range covered by this part.
    #[must_use]
    pub fn range(&self) -> Range<u64> {
        self.offset..self.offset + self.length
    }

    /// Prefix shared by every segment of `object`, e.g. `video.mp4/part-`.
    #[must_use]
    pub fn segment_prefix(object: &ObjectName) -> String {
        format!("{object}{SEGMENT_INFIX}")
    }

    /// Name of segment `index` of `object`, e.g. `video.mp4/part-00000002`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cloudfiles_core::ObjectName;
    /// use cloudfiles_model::Part;
    ///
    /// let name = ObjectName::new("new_object").unwrap();
    /// assert_eq!(Part::segment_name(&name, 2), "new_object/part-00000002");
    /// ```
    #[must_use]
    pub fn segment_name(object: &ObjectName, index: usize) -> String {
        format!(
            "{}{index:0width$}",
            Self::segment_prefix(object),
            width = SEGMENT_INDEX_WIDTH
        )
    }
}

/// The result of planning an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPlan {
    /// Name of the logical object.
    pub object_name: ObjectName,
    /// Size of the whole source.
    pub total_size: u64,
    /// Segment size the plan was computed with.
    pub part_size: u64,
    /// Maximum segments in flight.
    pub concurrency: usize,
    /// Whether the upload is split into segments plus a manifest.
    pub is_multipart: bool,
    /// Parts in index order.
    pub parts: Vec<Part>,
}

impl UploadPlan {
    /// Number of parts.
    #[must_use]
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Segment prefix the manifest refers to.
    #[must_use]
    pub fn segment_prefix(&self) -> String {
        Part::segment_prefix(&self.object_name)
    }

    /// Part names in index order.
    #[must_use]
    pub fn part_names(&self) -> Vec<&str> {
        self.parts.iter().map(|p| p.name.as_str()).collect()
    }
}
