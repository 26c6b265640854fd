//! Splits a tall raster into page-sized slices.
//!
//! Cuts prefer section boundaries: a section that would straddle the bottom
//! of a page moves to the next page, unless it already starts at the top of
//! the current one (then it is taller than a page and has to be split).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlice {
    /// First row, inclusive.
    pub top: u32,
    /// Last row, exclusive.
    pub bottom: u32,
}

impl PageSlice {
    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

/// `spans` are `(top, bottom)` row ranges of the sections, in any order.
pub fn paginate(total_height: u32, page_height: u32, spans: &[(u32, u32)]) -> Vec<PageSlice> {
    let page_height = page_height.max(1);
    let mut slices = Vec::new();
    let mut cursor = 0;

    while cursor < total_height {
        let limit = cursor.saturating_add(page_height);
        if limit >= total_height {
            slices.push(PageSlice {
                top: cursor,
                bottom: total_height,
            });
            break;
        }

        let cut = spans
            .iter()
            .filter(|(top, bottom)| *top > cursor && *top < limit && *bottom > limit)
            .map(|(top, _)| *top)
            .min()
            .unwrap_or(limit);

        slices.push(PageSlice {
            top: cursor,
            bottom: cut,
        });
        cursor = cut;
    }
    slices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_content_is_one_page() {
        assert_eq!(
            paginate(400, 1000, &[(0, 200), (200, 400)]),
            vec![PageSlice { top: 0, bottom: 400 }]
        );
        assert!(paginate(0, 1000, &[]).is_empty());
    }

    #[test]
    fn test_straddling_section_moves_to_next_page() {
        let slices = paginate(1000, 600, &[(0, 300), (300, 700), (700, 1000)]);
        assert_eq!(
            slices,
            vec![
                PageSlice { top: 0, bottom: 300 },
                PageSlice { top: 300, bottom: 700 },
                PageSlice { top: 700, bottom: 1000 },
            ]
        );
    }

    #[test]
    fn test_oversized_section_is_split_at_page_height() {
        let slices = paginate(1500, 600, &[(0, 1500)]);
        assert_eq!(
            slices,
            vec![
                PageSlice { top: 0, bottom: 600 },
                PageSlice { top: 600, bottom: 1200 },
                PageSlice { top: 1200, bottom: 1500 },
            ]
        );
    }

    #[test]
    fn test_sections_that_fit_are_never_split() {
        let layouts: [&[(u32, u32)]; 3] = [
            &[(20, 180), (190, 520), (530, 610), (620, 1100), (1110, 1400)],
            &[(0, 590), (600, 1190), (1200, 1790)],
            &[(10, 100), (100, 650), (650, 900), (900, 2100), (2100, 2300)],
        ];
        for spans in layouts {
            let total = spans.iter().map(|s| s.1).max().unwrap_or(0) + 10;
            let slices = paginate(total, 600, spans);

            assert_eq!(slices.first().map(|s| s.top), Some(0));
            assert_eq!(slices.last().map(|s| s.bottom), Some(total));
            for pair in slices.windows(2) {
                assert_eq!(pair[0].bottom, pair[1].top);
            }
            for slice in &slices {
                assert!(slice.height() > 0 && slice.height() <= 600);
            }
            for &(top, bottom) in spans.iter().filter(|(t, b)| b - t <= 600) {
                assert!(
                    slices.iter().any(|s| s.top <= top && bottom <= s.bottom),
                    "section {top}..{bottom} split across {slices:?}"
                );
            }
        }
    }
}
