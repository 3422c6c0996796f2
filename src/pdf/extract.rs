//! Full-document text extraction

use crate::error::{Error, Result};
use crate::pdf::LoadedPdf;

/// Join the text fragments of one page
pub fn join_page_fragments(fragments: &[String]) -> String {
    fragments.join(" ")
}

/// Extract the text of every page, in page order.
///
/// Pages are fetched one at a time; page `n + 1` is not requested until page `n`
/// has resolved. Each page contributes its fragments joined by a single space and
/// followed by a newline. The first page that fails aborts the whole extraction.
pub async fn extract_text(document: &dyn LoadedPdf) -> Result<String> {
    let page_count = document.page_count();
    let mut full_text = String::new();

    for page in 1..=page_count {
        let fragments = document.page_text(page).await.map_err(|e| {
            tracing::warn!(page, error = %e, "page text retrieval failed");
            Error::Extraction {
                page,
                reason: e.to_string(),
            }
        })?;

        full_text.push_str(&join_page_fragments(&fragments));
        full_text.push('\n');
    }

    tracing::debug!(page_count, chars = full_text.len(), "text extraction complete");
    Ok(full_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::RenderedPage;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    struct FakePdf {
        pages: Vec<Option<Vec<&'static str>>>,
        requested: Mutex<Vec<u32>>,
        in_flight: Mutex<u32>,
    }

    impl FakePdf {
        fn new(pages: Vec<Option<Vec<&'static str>>>) -> Self {
            Self {
                pages,
                requested: Mutex::new(Vec::new()),
                in_flight: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl LoadedPdf for FakePdf {
        fn page_count(&self) -> u32 {
            self.pages.len() as u32
        }

        async fn page_text(&self, page: u32) -> Result<Vec<String>> {
            {
                let mut in_flight = self.in_flight.lock();
                *in_flight += 1;
                assert_eq!(*in_flight, 1, "pages must be fetched one at a time");
            }
            self.requested.lock().push(page);

            // Earlier pages resolve slower than later ones
            let delay = 5 * (self.pages.len() as u64 + 1 - page as u64);
            tokio::time::sleep(Duration::from_millis(delay)).await;

            *self.in_flight.lock() -= 1;
            match &self.pages[(page - 1) as usize] {
                Some(items) => Ok(items.iter().map(|s| s.to_string()).collect()),
                None => Err(Error::Pdfium {
                    reason: "broken page".to_string(),
                }),
            }
        }

        async fn render_page(&self, _page: u32, _scale: f32) -> Result<RenderedPage> {
            unreachable!("extraction never renders")
        }
    }

    #[tokio::test]
    async fn test_pages_joined_in_order_with_trailing_newline() {
        let pdf = FakePdf::new(vec![Some(vec!["A"]), Some(vec!["B,", "C"])]);

        let text = extract_text(&pdf).await.unwrap();

        assert_eq!(text, "A\nB, C\n");
        assert_eq!(*pdf.requested.lock(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_one_segment_per_page() {
        let pdf = FakePdf::new(vec![
            Some(vec!["one"]),
            Some(vec![]),
            Some(vec!["three", "3"]),
            Some(vec!["four"]),
        ]);

        let text = extract_text(&pdf).await.unwrap();

        let segments: Vec<&str> = text.strip_suffix('\n').unwrap().split('\n').collect();
        assert_eq!(segments, vec!["one", "", "three 3", "four"]);
    }

    #[tokio::test]
    async fn test_failing_page_aborts_extraction() {
        let pdf = FakePdf::new(vec![Some(vec!["ok"]), None, Some(vec!["never"])]);

        let result = extract_text(&pdf).await;

        assert!(matches!(result, Err(Error::Extraction { page: 2, .. })));
        // Page 3 is never requested after page 2 fails
        assert_eq!(*pdf.requested.lock(), vec![1, 2]);
    }

    #[test]
    fn test_empty_document_yields_empty_text() {
        let pdf = FakePdf::new(vec![]);
        let text = tokio_test::block_on(extract_text(&pdf)).unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn test_join_page_fragments() {
        let fragments = vec!["Jane".to_string(), "Doe".to_string()];
        assert_eq!(join_page_fragments(&fragments), "Jane Doe");
        assert_eq!(join_page_fragments(&[]), "");
    }
}
