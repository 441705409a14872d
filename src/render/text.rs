use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::foundation::error::{FanfareError, FanfareResult};

/// Brush slot required by Parley; color is applied at paint time instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrush;

const LAYOUT_CACHE_CAP: usize = 4096;

/// Raw font file bytes shared between the shaper and the rasterizer.
#[derive(Clone, Debug)]
pub struct FontBytes(Arc<Vec<u8>>);

impl FontBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Arc::new(bytes))
    }

    /// Read a TTF/OTF file.
    pub fn from_path(path: &Path) -> FanfareResult<Self> {
        use anyhow::Context as _;

        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        if bytes.is_empty() {
            return Err(FanfareError::validation(format!(
                "font file '{}' is empty",
                path.display()
            )));
        }
        Ok(Self::new(bytes))
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

/// Shapes strings with one registered font and caches the resulting layouts.
pub(crate) struct TextShaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
    cache: HashMap<(String, u32), parley::Layout<TextBrush>>,
}

impl TextShaper {
    pub(crate) fn new(font_bytes: &FontBytes) -> FanfareResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.as_slice().to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            FanfareError::validation("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| FanfareError::validation("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font_bytes.as_slice().to_vec()),
            0,
        );

        tracing::debug!(family = %family_name, "registered font");
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font,
            cache: HashMap::new(),
        })
    }

    pub(crate) fn font(&self) -> &vello_cpu::peniko::FontData {
        &self.font
    }

    /// Shaped single-line layout of `text`, cached per `(text, size)`.
    pub(crate) fn layout(
        &mut self,
        text: &str,
        size_px: f32,
    ) -> FanfareResult<&parley::Layout<TextBrush>> {
        let key = (text.to_owned(), size_px.to_bits());
        if !self.cache.contains_key(&key) {
            if self.cache.len() >= LAYOUT_CACHE_CAP {
                self.cache.clear();
            }
            let layout = self.build(text, size_px);
            self.cache.insert(key.clone(), layout);
        }
        self.cache
            .get(&key)
            .ok_or_else(|| FanfareError::layout("text layout cache miss"))
    }

    fn build(&mut self, text: &str, size_px: f32) -> parley::Layout<TextBrush> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}
