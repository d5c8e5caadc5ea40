//! PDF Document builder

use crate::builtin::BuiltinFont;
use crate::graphics::{fill_rect_operators, line_operators, stroke_rect_operators};
use crate::image::{
    calculate_scaled_dimensions, generate_image_operators, ImageScaleMode, ImageXObject,
    RasterImage,
};
use crate::text::{generate_text_operators, TextRenderContext};
use crate::{Align, FontData, FontFamily, FontFamilyBuilder, FontWeight, PdfError, Result};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Name of the always-available Helvetica family
pub const BUILTIN_FAMILY: &str = "helvetica";

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// A4 portrait (595.28 x 841.89 points)
    pub const A4: PageSize = PageSize {
        width: 595.28,
        height: 841.89,
    };

    /// Same page turned sideways
    pub fn landscape(self) -> Self {
        Self {
            width: self.width.max(self.height),
            height: self.width.min(self.height),
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// Identifies one concrete font face used on a page
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum FontKey {
    Builtin(BuiltinFont),
    Embedded { family: String, weight: FontWeight },
}

/// Buffered state of one page (written at save time)
#[derive(Debug, Clone)]
struct PageState {
    size: PageSize,
    content: Vec<u8>,
    fonts: BTreeSet<FontKey>,
    images: BTreeSet<usize>,
}

/// PDF Document builder providing high-level drawing operations
///
/// Pages, fonts and images are buffered in memory and only turned into PDF
/// objects by [`PdfDocument::to_bytes`]. Output is byte-identical for
/// identical drawing calls.
pub struct PdfDocument {
    /// Size used by `add_page`
    default_size: PageSize,
    pages: Vec<PageState>,
    /// Registered TrueType families
    font_families: BTreeMap<String, FontFamily>,
    current_family: String,
    current_weight: FontWeight,
    current_font_size: f32,
    current_text_color: Color,
    /// Font face -> resource name ("F1", "F2", ...), shared by all pages
    font_resources: BTreeMap<FontKey, String>,
    next_font_resource: u32,
    /// Image XObjects in insertion order; resource name is "Im{index + 1}"
    images: Vec<ImageXObject>,
    /// Data hash -> index into `images`
    image_index: HashMap<u64, usize>,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new(PageSize::A4)
    }
}

impl PdfDocument {
    /// Create an empty document
    ///
    /// # Arguments
    /// * `default_size` - Size of pages created with `add_page`
    pub fn new(default_size: PageSize) -> Self {
        Self {
            default_size,
            pages: Vec::new(),
            font_families: BTreeMap::new(),
            current_family: BUILTIN_FAMILY.to_string(),
            current_weight: FontWeight::default(),
            current_font_size: 12.0,
            current_text_color: Color::default(),
            font_resources: BTreeMap::new(),
            next_font_resource: 1,
            images: Vec::new(),
            image_index: HashMap::new(),
        }
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append a blank page with the default size
    ///
    /// # Returns
    /// New page number (1-indexed)
    pub fn add_page(&mut self) -> usize {
        self.add_page_with_size(self.default_size)
    }

    /// Append a blank page with an explicit size
    pub fn add_page_with_size(&mut self, size: PageSize) -> usize {
        self.pages.push(PageState {
            size,
            content: Vec::new(),
            fonts: BTreeSet::new(),
            images: BTreeSet::new(),
        });
        self.pages.len()
    }

    /// Get the size of a page
    pub fn page_size(&self, page: usize) -> Result<PageSize> {
        Ok(self.page(page)?.size)
    }

    fn page(&self, page: usize) -> Result<&PageState> {
        let count = self.pages.len();
        page.checked_sub(1)
            .and_then(|index| self.pages.get(index))
            .ok_or(PdfError::InvalidPage(page, count))
    }

    fn page_mut(&mut self, page: usize) -> Result<&mut PageState> {
        let count = self.pages.len();
        page.checked_sub(1)
            .and_then(|index| self.pages.get_mut(index))
            .ok_or(PdfError::InvalidPage(page, count))
    }

    /// Register a font family with its variants
    ///
    /// # Example
    /// ```ignore
    /// doc.register_font_family("noto",
    ///     FontFamilyBuilder::new()
    ///         .regular(std::fs::read("NotoSans-Regular.ttf")?)
    ///         .bold(std::fs::read("NotoSans-Bold.ttf")?)
    /// )?;
    /// ```
    pub fn register_font_family(&mut self, name: &str, builder: FontFamilyBuilder) -> Result<()> {
        if name == BUILTIN_FAMILY || self.font_families.contains_key(name) {
            return Err(PdfError::FontAlreadyExists(name.to_string()));
        }

        let family = builder.build(name)?;
        self.font_families.insert(name.to_string(), family);

        Ok(())
    }

    /// Check whether a family can be used with `set_font`
    pub fn has_font_family(&self, name: &str) -> bool {
        name == BUILTIN_FAMILY || self.font_families.contains_key(name)
    }

    /// Set the current font family and size
    ///
    /// # Example
    /// ```ignore
    /// doc.set_font("helvetica", 12.0)?;  // Regular 12pt
    /// doc.set_font_weight(FontWeight::Bold);  // Now bold 12pt
    /// ```
    pub fn set_font(&mut self, family: &str, size: f32) -> Result<()> {
        if !self.has_font_family(family) {
            return Err(PdfError::FontNotFound(family.to_string()));
        }

        self.current_family = family.to_string();
        self.current_font_size = size;

        Ok(())
    }

    /// Set the font weight (keeps current family/size)
    pub fn set_font_weight(&mut self, weight: FontWeight) {
        self.current_weight = weight;
    }

    /// Set the text color
    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    /// Resolve a family/weight pair to a concrete face
    ///
    /// Families without a bold variant fall back to regular.
    fn resolve_font(&self, family: &str, weight: FontWeight) -> Result<FontKey> {
        if family == BUILTIN_FAMILY {
            let font = match weight {
                FontWeight::Regular => BuiltinFont::Helvetica,
                FontWeight::Bold => BuiltinFont::HelveticaBold,
            };
            return Ok(FontKey::Builtin(font));
        }

        let data = self
            .font_families
            .get(family)
            .ok_or_else(|| PdfError::FontNotFound(family.to_string()))?;
        let weight = match weight {
            FontWeight::Bold if data.bold.is_some() => FontWeight::Bold,
            _ => FontWeight::Regular,
        };
        Ok(FontKey::Embedded {
            family: family.to_string(),
            weight,
        })
    }

    fn embedded_font(&self, family: &str, weight: FontWeight) -> Result<&FontData> {
        self.font_families
            .get(family)
            .map(|f| f.get_variant(weight))
            .ok_or_else(|| PdfError::FontNotFound(family.to_string()))
    }

    fn key_text_width(&self, key: &FontKey, text: &str, size: f32) -> Result<f64> {
        let width = match key {
            FontKey::Builtin(font) => font.text_width_points(text, size),
            FontKey::Embedded { family, weight } => {
                self.embedded_font(family, *weight)?.text_width_points(text, size)
            }
        };
        Ok(width as f64)
    }

    /// Measure text in points for an explicit family, weight and size
    pub fn measure_text(
        &self,
        family: &str,
        weight: FontWeight,
        size: f32,
        text: &str,
    ) -> Result<f64> {
        let key = self.resolve_font(family, weight)?;
        self.key_text_width(&key, text, size)
    }

    /// Distance from the top of the line box to the baseline, in points
    pub fn ascent(&self, family: &str, weight: FontWeight, size: f32) -> Result<f64> {
        let key = self.resolve_font(family, weight)?;
        let units = match &key {
            FontKey::Builtin(font) => font.ascender() as f64 / 1000.0,
            FontKey::Embedded { family, weight } => {
                let data = self.embedded_font(family, *weight)?;
                data.ascender() as f64 / data.units_per_em().max(1) as f64
            }
        };
        Ok(units * size as f64)
    }

    /// Get current font's text width for a string
    ///
    /// # Example
    /// ```ignore
    /// doc.set_font("helvetica", 12.0)?;
    /// let width = doc.get_text_width("Hello")?;
    /// ```
    pub fn get_text_width(&self, text: &str) -> Result<f64> {
        self.measure_text(
            &self.current_family,
            self.current_weight,
            self.current_font_size,
            text,
        )
    }

    /// Get or create the resource name for a font face
    fn font_resource_name(&mut self, key: &FontKey) -> String {
        if let Some(name) = self.font_resources.get(key) {
            return name.clone();
        }
        let name = format!("F{}", self.next_font_resource);
        self.next_font_resource += 1;
        self.font_resources.insert(key.clone(), name.clone());
        name
    }

    /// Insert text at a specific position
    ///
    /// # Arguments
    /// * `text` - Text to insert (single line)
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Baseline Y coordinate in points (from top)
    /// * `align` - Alignment of the text relative to `x`
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        align: Align,
    ) -> Result<()> {
        let page_height = self.page(page)?.size.height;

        // Skip empty text - nothing to render
        if text.is_empty() {
            return Ok(());
        }

        let key = self.resolve_font(&self.current_family, self.current_weight)?;
        let text_width = self.key_text_width(&key, text, self.current_font_size)?;

        let text_hex = match &key {
            FontKey::Builtin(font) => font.encode_text_hex(text),
            FontKey::Embedded { family, weight } => {
                let family = self
                    .font_families
                    .get_mut(family)
                    .ok_or_else(|| PdfError::FontNotFound(family.clone()))?;
                let data = family.get_variant_mut(*weight);
                // Track characters for the width array and ToUnicode map
                data.add_chars(text);
                data.encode_text_hex(text)
            }
        };

        let ctx = TextRenderContext {
            font_name: self.font_resource_name(&key),
            font_size: self.current_font_size,
            text_width,
            color: self.current_text_color,
        };

        // Convert Y coordinate from top-origin to PDF bottom-origin
        let operators = generate_text_operators(&text_hex, x, page_height - y, align, &ctx);

        let state = self.page_mut(page)?;
        state.fonts.insert(key);
        state.content.extend_from_slice(&operators);

        Ok(())
    }

    /// Fill a rectangle (`y` is the top edge, from top)
    pub fn fill_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    ) -> Result<()> {
        let state = self.page_mut(page)?;
        let pdf_y = state.size.height - y - height;
        let operators = fill_rect_operators(x, pdf_y, width, height, color);
        state.content.extend_from_slice(&operators);
        Ok(())
    }

    /// Stroke a rectangle outline (`y` is the top edge, from top)
    #[allow(clippy::too_many_arguments)]
    pub fn stroke_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
        line_width: f64,
    ) -> Result<()> {
        let state = self.page_mut(page)?;
        let pdf_y = state.size.height - y - height;
        let operators = stroke_rect_operators(x, pdf_y, width, height, color, line_width);
        state.content.extend_from_slice(&operators);
        Ok(())
    }

    /// Draw a straight line between two points (from top)
    #[allow(clippy::too_many_arguments)]
    pub fn draw_line(
        &mut self,
        page: usize,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
        line_width: f64,
    ) -> Result<()> {
        let state = self.page_mut(page)?;
        let height = state.size.height;
        let operators = line_operators(x1, height - y1, x2, height - y2, color, line_width);
        state.content.extend_from_slice(&operators);
        Ok(())
    }

    /// Insert an image at a specific position
    ///
    /// # Arguments
    /// * `data` - Image file bytes (JPEG or PNG)
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Y coordinate of the top edge in points (from top)
    /// * `width` - Image width in points
    /// * `height` - Image height in points
    pub fn insert_image(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        self.insert_image_scaled(data, page, x, y, width, height, ImageScaleMode::Stretch)
    }

    /// Insert encoded image bytes with a scaling mode
    #[allow(clippy::too_many_arguments)]
    pub fn insert_image_scaled(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        mode: ImageScaleMode,
    ) -> Result<()> {
        self.page(page)?;
        let index = self.get_or_create_image(data, || ImageXObject::from_encoded(data))?;
        self.place_image(index, page, x, y, width, height, mode)
    }

    /// Insert already decoded pixels with a scaling mode
    #[allow(clippy::too_many_arguments)]
    pub fn insert_raster(
        &mut self,
        raster: &RasterImage,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        mode: ImageScaleMode,
    ) -> Result<()> {
        self.page(page)?;
        let index = self.get_or_create_image(raster, || ImageXObject::from_raster(raster))?;
        self.place_image(index, page, x, y, width, height, mode)
    }

    /// Look up an image by content hash, creating the XObject on first use
    fn get_or_create_image<T, F>(&mut self, source: &T, create: F) -> Result<usize>
    where
        T: Hash + ?Sized,
        F: FnOnce() -> Result<ImageXObject>,
    {
        let mut hasher = DefaultHasher::new();
        source.hash(&mut hasher);
        let data_hash = hasher.finish();

        if let Some(&index) = self.image_index.get(&data_hash) {
            return Ok(index);
        }

        let xobject = create()
            .map_err(|e| PdfError::ImageError(format!("Failed to create image XObject: {e}")))?;
        self.images.push(xobject);
        let index = self.images.len() - 1;
        self.image_index.insert(data_hash, index);
        Ok(index)
    }

    #[allow(clippy::too_many_arguments)]
    fn place_image(
        &mut self,
        index: usize,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        mode: ImageScaleMode,
    ) -> Result<()> {
        let (orig_width, orig_height) = (self.images[index].width, self.images[index].height);
        let (actual_width, actual_height) =
            calculate_scaled_dimensions(orig_width, orig_height, width, height, mode);

        let state = self.page_mut(page)?;
        let pdf_y = state.size.height - y - actual_height;
        let operators = generate_image_operators(
            &format!("Im{}", index + 1),
            x,
            pdf_y,
            actual_width,
            actual_height,
        );
        state.images.insert(index);
        state.content.extend_from_slice(&operators);

        Ok(())
    }

    /// Save the document to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Serialize the document to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut doc = self.build()?;
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(buffer)
    }

    /// Build the lopdf object graph from the buffered state
    fn build(&self) -> Result<Document> {
        if self.pages.is_empty() {
            return Err(PdfError::SaveError("Document has no pages".to_string()));
        }

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut font_ids: BTreeMap<&FontKey, ObjectId> = BTreeMap::new();
        for key in self.font_resources.keys() {
            let id = match key {
                FontKey::Builtin(font) => doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => font.base_font(),
                    "Encoding" => "WinAnsiEncoding",
                }),
                FontKey::Embedded { family, weight } => {
                    embed_font_object(&mut doc, self.embedded_font(family, *weight)?)?
                }
            };
            font_ids.insert(key, id);
        }

        let image_ids: Vec<ObjectId> = self
            .images
            .iter()
            .map(|xobject| doc.add_object(xobject.to_pdf_stream()))
            .collect();

        let mut kids = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let mut resources = Dictionary::new();

            if !page.fonts.is_empty() {
                let mut font_dict = Dictionary::new();
                for key in &page.fonts {
                    let (name, id) = self
                        .font_resources
                        .get(key)
                        .zip(font_ids.get(key))
                        .ok_or_else(|| PdfError::SaveError(format!("Unregistered font {key:?}")))?;
                    font_dict.set(name.as_bytes(), Object::Reference(*id));
                }
                resources.set("Font", font_dict);
            }

            if !page.images.is_empty() {
                let mut xobject_dict = Dictionary::new();
                for &index in &page.images {
                    xobject_dict.set(
                        format!("Im{}", index + 1).into_bytes(),
                        Object::Reference(image_ids[index]),
                    );
                }
                resources.set("XObject", xobject_dict);
            }

            let contents_id = doc.add_object(Stream::new(Dictionary::new(), page.content.clone()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    Object::Real(page.size.width as _),
                    Object::Real(page.size.height as _),
                ],
                "Resources" => resources,
                "Contents" => contents_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Ok(doc)
    }
}

/// Embed a TrueType font as a Type0 font, returning the Type0 object ID
fn embed_font_object(doc: &mut Document, font_data: &FontData) -> Result<ObjectId> {
    let font_objects = font_data.to_pdf_objects()?;

    let font_file_id = doc.add_object(font_objects.font_file_stream);

    let mut font_descriptor = font_objects.font_descriptor;
    font_descriptor.set("FontFile2", Object::Reference(font_file_id));
    let font_descriptor_id = doc.add_object(font_descriptor);

    let mut cid_font = font_objects.cid_font;
    cid_font.set("FontDescriptor", Object::Reference(font_descriptor_id));
    let cid_font_id = doc.add_object(cid_font);

    let tounicode_id = doc.add_object(font_objects.tounicode_stream);

    let mut type0_font = font_objects.type0_font;
    type0_font.set(
        "DescendantFonts",
        Object::Array(vec![Object::Reference(cid_font_id)]),
    );
    type0_font.set("ToUnicode", Object::Reference(tounicode_id));

    Ok(doc.add_object(type0_font))
}
