//! Pagination arithmetic shared by the patient and clinical-history
//! listings. Both stores window their queries through [`paginate`]; the two
//! paths must never diverge.

/// Query window plus the numbers a listing view needs to render its pager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// Rows to skip: `page_size * (page - 1)`.
    pub skip: u64,
    /// Rows per page.
    pub limit: u64,
    /// `ceil(total / page_size)`, reported as `None` when the whole result
    /// set fits on one page — callers render no pager in that case.
    pub page_count: Option<u32>,
    /// `1..=page_count` when a pager is needed, empty otherwise.
    pub page_index_list: Vec<u32>,
}

/// Compute the window for a 1-indexed `page`. A `page` of zero is treated
/// as 1. `page_size` must be positive.
pub fn paginate(total_count: u64, page: u32, page_size: u32) -> PageWindow {
    assert!(page_size > 0, "page_size must be positive");

    let page = page.max(1);
    let size = u64::from(page_size);
    let count = total_count.div_ceil(size) as u32;
    let skip = size * u64::from(page - 1);

    let (page_count, page_index_list) = if count > 1 {
        (Some(count), (1..=count).collect())
    } else {
        (None, Vec::new())
    };

    PageWindow {
        skip,
        limit: size,
        page_count,
        page_index_list,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_is_ceiling_of_total_over_size() {
        assert_eq!(paginate(45, 1, 20).page_count, Some(3));
        assert_eq!(paginate(40, 1, 20).page_count, Some(2));
        assert_eq!(paginate(41, 1, 20).page_count, Some(3));
    }

    #[test]
    fn single_page_reports_no_page_count() {
        assert_eq!(paginate(20, 1, 20).page_count, None);
        assert_eq!(paginate(1, 1, 20).page_count, None);
        assert!(paginate(20, 1, 20).page_index_list.is_empty());
    }

    #[test]
    fn empty_result_set_reports_no_page_count() {
        let window = paginate(0, 1, 20);
        assert_eq!(window.page_count, None);
        assert!(window.page_index_list.is_empty());
        assert_eq!(window.skip, 0);
    }

    #[test]
    fn index_list_runs_from_one_to_page_count() {
        let window = paginate(45, 2, 20);
        assert_eq!(window.page_index_list, vec![1, 2, 3]);
        assert_eq!(
            window.page_index_list.len(),
            window.page_count.unwrap() as usize
        );
    }

    #[test]
    fn skip_advances_by_page_size() {
        assert_eq!(paginate(45, 1, 20).skip, 0);
        assert_eq!(paginate(45, 2, 20).skip, 20);
        assert_eq!(paginate(45, 3, 20).skip, 40);
        assert_eq!(paginate(45, 2, 20).limit, 20);
    }

    #[test]
    fn page_zero_defaults_to_first_page() {
        assert_eq!(paginate(45, 0, 20), paginate(45, 1, 20));
    }
}
