//! Zoom handling and page surfaces

use crate::error::Result;
use crate::pdf::cache::{RenderCache, RenderKey};
use crate::pdf::{LoadedPdf, RenderedPage};
use crate::source::SourceId;

const MIN_ZOOM_TENTHS: u8 = 5;
const MAX_ZOOM_TENTHS: u8 = 20;
const DEFAULT_ZOOM_TENTHS: u8 = 9;

/// Page zoom, bounded to [0.5, 2.0] in steps of 0.1.
///
/// Stored in tenths so repeated steps never drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Zoom(u8);

impl Zoom {
    pub const MIN: Zoom = Zoom(MIN_ZOOM_TENTHS);
    pub const MAX: Zoom = Zoom(MAX_ZOOM_TENTHS);

    /// Nearest valid zoom for a scale factor
    pub fn from_scale(scale: f32) -> Self {
        if !scale.is_finite() {
            return Self::default();
        }
        let tenths = (scale * 10.0)
            .round()
            .clamp(MIN_ZOOM_TENTHS as f32, MAX_ZOOM_TENTHS as f32);
        Zoom(tenths as u8)
    }

    pub fn scale(self) -> f32 {
        self.0 as f32 / 10.0
    }

    pub fn tenths(self) -> u8 {
        self.0
    }

    /// Rounded percentage shown next to the zoom buttons
    pub fn percent(self) -> u32 {
        self.0 as u32 * 10
    }

    /// One step larger; a no-op at the maximum
    pub fn zoom_in(self) -> Self {
        Zoom((self.0 + 1).min(MAX_ZOOM_TENTHS))
    }

    /// One step smaller; a no-op at the minimum
    pub fn zoom_out(self) -> Self {
        Zoom(self.0.saturating_sub(1).max(MIN_ZOOM_TENTHS))
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Zoom(DEFAULT_ZOOM_TENTHS)
    }
}

/// Produces page surfaces for the active document at a given zoom.
///
/// Surfaces are recomputed from the already-open document when the zoom changes;
/// the document itself is never reloaded.
pub struct PageRenderer {
    cache: RenderCache,
}

impl PageRenderer {
    pub fn new(cache_entries: usize, cache_bytes: usize) -> Self {
        Self {
            cache: RenderCache::new(cache_entries, cache_bytes),
        }
    }

    /// Surface for one page of `document` at `zoom`
    pub async fn surface(
        &self,
        source: SourceId,
        document: &dyn LoadedPdf,
        page: u32,
        zoom: Zoom,
    ) -> Result<RenderedPage> {
        let key = RenderKey {
            source,
            page,
            scale_tenths: zoom.tenths(),
        };

        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let rendered = document.render_page(page, zoom.scale()).await?;
        self.cache.put(key, rendered.clone());
        Ok(rendered)
    }

    /// Drop all surfaces of a source that is no longer active
    pub fn release(&self, source: SourceId) {
        let released = self.cache.release_source(source);
        if released > 0 {
            tracing::debug!(%source, released, "released rendered pages");
        }
    }

    pub fn cached_surfaces(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use rstest::rstest;
    use std::sync::Arc;

    #[test]
    fn test_default_zoom() {
        assert_eq!(Zoom::default().scale(), 0.9);
        assert_eq!(Zoom::default().percent(), 90);
    }

    #[test]
    fn test_zoom_in_stops_at_max() {
        let mut zoom = Zoom::default();
        for _ in 0..30 {
            zoom = zoom.zoom_in();
        }
        assert_eq!(zoom, Zoom::MAX);
        assert_eq!(zoom.scale(), 2.0);
        assert_eq!(zoom.zoom_in(), zoom);
    }

    #[test]
    fn test_zoom_out_stops_at_min() {
        let mut zoom = Zoom::default();
        for _ in 0..30 {
            zoom = zoom.zoom_out();
        }
        assert_eq!(zoom, Zoom::MIN);
        assert_eq!(zoom.scale(), 0.5);
        assert_eq!(zoom.zoom_out(), zoom);
    }

    #[test]
    fn test_steps_do_not_drift() {
        let zoom = Zoom::default().zoom_in().zoom_in().zoom_out();
        assert_eq!(zoom.scale(), 1.0);
        assert_eq!(zoom.percent(), 100);
    }

    #[rstest]
    #[case(0.0, 0.5)]
    #[case(0.94, 0.9)]
    #[case(1.25, 1.3)]
    #[case(7.0, 2.0)]
    #[case(f32::NAN, 0.9)]
    fn test_from_scale_clamps(#[case] input: f32, #[case] expected: f32) {
        assert_eq!(Zoom::from_scale(input).scale(), expected);
    }

    struct CountingPdf {
        renders: Mutex<Vec<(u32, f32)>>,
    }

    #[async_trait]
    impl LoadedPdf for CountingPdf {
        fn page_count(&self) -> u32 {
            3
        }

        async fn page_text(&self, _page: u32) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        async fn render_page(&self, page: u32, scale: f32) -> Result<RenderedPage> {
            self.renders.lock().push((page, scale));
            Ok(RenderedPage {
                page,
                width: (100.0 * scale) as u32,
                height: (140.0 * scale) as u32,
                png: Arc::new(vec![0u8; 16]),
            })
        }
    }

    #[tokio::test]
    async fn test_surface_cached_per_zoom() {
        let renderer = PageRenderer::new(16, 1024);
        let pdf = CountingPdf {
            renders: Mutex::new(Vec::new()),
        };
        let source = SourceId::new();

        let first = renderer
            .surface(source, &pdf, 1, Zoom::default())
            .await
            .unwrap();
        let again = renderer
            .surface(source, &pdf, 1, Zoom::default())
            .await
            .unwrap();
        assert_eq!(first.width, again.width);
        assert_eq!(pdf.renders.lock().len(), 1);

        let zoomed = renderer
            .surface(source, &pdf, 1, Zoom::default().zoom_in())
            .await
            .unwrap();
        assert_eq!(zoomed.width, 100);
        assert_eq!(*pdf.renders.lock(), vec![(1, 0.9), (1, 1.0)]);
    }

    #[tokio::test]
    async fn test_release_drops_source_surfaces() {
        let renderer = PageRenderer::new(16, 1024);
        let pdf = CountingPdf {
            renders: Mutex::new(Vec::new()),
        };
        let source = SourceId::new();

        renderer
            .surface(source, &pdf, 2, Zoom::default())
            .await
            .unwrap();
        assert_eq!(renderer.cached_surfaces(), 1);

        renderer.release(source);
        assert_eq!(renderer.cached_surfaces(), 0);
    }
}
