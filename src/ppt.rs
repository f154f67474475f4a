//! PPT Report Generator Module
//! Writes a PowerPoint deck of chart images, one heading and one row of
//! charts per slide.
//!
//! The package is assembled directly as ZIP/XML parts, which keeps image
//! embedding under our control.

use crate::error::ExportError;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use tracing::info;
use zip::write::FileOptions;
use zip::ZipWriter;

/// EMU (English Metric Units): 914400 EMU = 1 inch
const EMU_PER_INCH: i64 = 914400;
/// 16:9 slide, 13.333 x 7.5 inches
const SLIDE_WIDTH: i64 = 12192000;
const SLIDE_HEIGHT: i64 = 6858000;
const MARGIN: i64 = EMU_PER_INCH / 3;
const GAP: i64 = EMU_PER_INCH / 6;
const HEADING_HEIGHT: i64 = EMU_PER_INCH * 3 / 4;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_PKG_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// One slide: a heading above a single row of PNG images.
#[derive(Debug, Clone)]
pub struct Slide {
    pub heading: String,
    pub images: Vec<Vec<u8>>,
}

/// PPT generator for the sales report deck
pub struct PptGenerator;

impl PptGenerator {
    /// Write the deck to `output_path`.
    pub fn generate(slides: &[Slide], output_path: &Path, title: &str) -> Result<(), ExportError> {
        let file = BufWriter::new(File::create(output_path)?);
        Self::write_to(file, slides, title)?;

        let images: usize = slides.iter().map(|s| s.images.len()).sum();
        info!(
            path = %output_path.display(),
            slides = slides.len(),
            images,
            "PPT generated"
        );
        Ok(())
    }

    /// Write the deck to any seekable sink.
    pub fn write_to<W: Write + Seek>(sink: W, slides: &[Slide], title: &str) -> Result<W, ExportError> {
        let mut zip = ZipWriter::new(sink);
        let options = FileOptions::default();

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(content_types_xml(slides.len()).as_bytes())?;

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(package_rels_xml().as_bytes())?;

        zip.start_file("ppt/_rels/presentation.xml.rels", options)?;
        zip.write_all(presentation_rels_xml(slides.len()).as_bytes())?;

        zip.start_file("ppt/presentation.xml", options)?;
        zip.write_all(presentation_xml(slides.len()).as_bytes())?;

        // Images are numbered across the whole deck.
        let mut next_image = 1;
        for (idx, slide) in slides.iter().enumerate() {
            let slide_num = idx + 1;
            let image_ids: Vec<usize> = (next_image..next_image + slide.images.len()).collect();
            next_image += slide.images.len();

            zip.start_file(format!("ppt/slides/_rels/slide{slide_num}.xml.rels"), options)?;
            zip.write_all(slide_rels_xml(&image_ids).as_bytes())?;

            zip.start_file(format!("ppt/slides/slide{slide_num}.xml"), options)?;
            zip.write_all(slide_xml(&slide.heading, slide.images.len()).as_bytes())?;

            for (image_id, bytes) in image_ids.iter().zip(&slide.images) {
                zip.start_file(format!("ppt/media/image{image_id}.png"), options)?;
                zip.write_all(bytes)?;
            }
        }

        zip.start_file("ppt/slideLayouts/slideLayout1.xml", options)?;
        zip.write_all(slide_layout_xml().as_bytes())?;
        zip.start_file("ppt/slideLayouts/_rels/slideLayout1.xml.rels", options)?;
        zip.write_all(single_rel_xml("slideMaster", "../slideMasters/slideMaster1.xml").as_bytes())?;

        zip.start_file("ppt/slideMasters/slideMaster1.xml", options)?;
        zip.write_all(slide_master_xml().as_bytes())?;
        zip.start_file("ppt/slideMasters/_rels/slideMaster1.xml.rels", options)?;
        zip.write_all(master_rels_xml().as_bytes())?;

        zip.start_file("ppt/theme/theme1.xml", options)?;
        zip.write_all(theme_xml().as_bytes())?;

        zip.start_file("docProps/core.xml", options)?;
        zip.write_all(core_props_xml(title).as_bytes())?;
        zip.start_file("docProps/app.xml", options)?;
        zip.write_all(app_props_xml(slides.len()).as_bytes())?;

        Ok(zip.finish()?)
    }
}

/// Picture frames for `count` images laid out side by side below the heading,
/// as (x, y, width, height) in EMU. Images keep a 4:3 aspect ratio.
fn row_layout(count: usize) -> Vec<(i64, i64, i64, i64)> {
    if count == 0 {
        return Vec::new();
    }
    let n = count as i64;
    let top = MARGIN + HEADING_HEIGHT;
    let avail_w = SLIDE_WIDTH - 2 * MARGIN - (n - 1) * GAP;
    let avail_h = SLIDE_HEIGHT - top - MARGIN;

    let mut w = avail_w / n;
    let mut h = w * 3 / 4;
    if h > avail_h {
        h = avail_h;
        w = h * 4 / 3;
    }

    let used = n * w + (n - 1) * GAP;
    let left = (SLIDE_WIDTH - used) / 2;
    let y = top + (avail_h - h) / 2;
    (0..n).map(|i| (left + i * (w + GAP), y, w, h)).collect()
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const EMPTY_GROUP: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#;

fn content_types_xml(slide_count: usize) -> String {
    const PML: &str = "application/vnd.openxmlformats-officedocument.presentationml";
    let mut xml = format!(
        r#"{XML_DECL}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Default Extension="png" ContentType="image/png"/>
<Override PartName="/ppt/presentation.xml" ContentType="{PML}.presentation.main+xml"/>
<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="{PML}.slideMaster+xml"/>
<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="{PML}.slideLayout+xml"/>
<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
"#
    );
    for i in 1..=slide_count {
        xml.push_str(&format!(
            "<Override PartName=\"/ppt/slides/slide{i}.xml\" ContentType=\"{PML}.slide+xml\"/>\n"
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn package_rels_xml() -> String {
    format!(
        r#"{XML_DECL}
<Relationships xmlns="{NS_PKG_RELS}">
<Relationship Id="rId1" Type="{REL}/officeDocument" Target="ppt/presentation.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
<Relationship Id="rId3" Type="{REL}/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#
    )
}

fn single_rel_xml(kind: &str, target: &str) -> String {
    format!(
        r#"{XML_DECL}
<Relationships xmlns="{NS_PKG_RELS}">
<Relationship Id="rId1" Type="{REL}/{kind}" Target="{target}"/>
</Relationships>"#
    )
}

fn presentation_rels_xml(slide_count: usize) -> String {
    let mut xml = format!(
        r#"{XML_DECL}
<Relationships xmlns="{NS_PKG_RELS}">
<Relationship Id="rId1" Type="{REL}/slideMaster" Target="slideMasters/slideMaster1.xml"/>
<Relationship Id="rId2" Type="{REL}/theme" Target="theme/theme1.xml"/>
"#
    );
    // Slides start at rId3, after the master and theme.
    for i in 1..=slide_count {
        xml.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"{REL}/slide\" Target=\"slides/slide{i}.xml\"/>\n",
            i + 2
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn presentation_xml(slide_count: usize) -> String {
    let slide_ids: String = (1..=slide_count)
        .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + i, i + 2))
        .collect();

    format!(
        r#"{XML_DECL}
<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}">
<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
<p:sldIdLst>{slide_ids}</p:sldIdLst>
<p:sldSz cx="{SLIDE_WIDTH}" cy="{SLIDE_HEIGHT}"/>
<p:notesSz cx="{SLIDE_HEIGHT}" cy="{SLIDE_WIDTH}"/>
</p:presentation>"#
    )
}

fn slide_rels_xml(image_ids: &[usize]) -> String {
    let mut xml = format!(
        r#"{XML_DECL}
<Relationships xmlns="{NS_PKG_RELS}">
<Relationship Id="rId1" Type="{REL}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
"#
    );
    // rId1 is the layout, so image k on the slide is rId(k + 2).
    for (idx, image_id) in image_ids.iter().enumerate() {
        xml.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"{REL}/image\" Target=\"../media/image{image_id}.png\"/>\n",
            idx + 2
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn slide_xml(heading: &str, image_count: usize) -> String {
    let heading = escape_xml(heading);
    let mut shapes = format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Heading"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>
<p:spPr><a:xfrm><a:off x="{MARGIN}" y="{MARGIN}"/><a:ext cx="{}" cy="{HEADING_HEIGHT}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>
<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US" sz="2800" b="1"/><a:t>{heading}</a:t></a:r></a:p></p:txBody></p:sp>"#,
        SLIDE_WIDTH - 2 * MARGIN
    );

    for (idx, (x, y, w, h)) in row_layout(image_count).into_iter().enumerate() {
        let shape_id = idx + 3;
        let r_id = idx + 2;
        shapes.push_str(&format!(
            r#"
<p:pic><p:nvPicPr><p:cNvPr id="{shape_id}" name="Chart {}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>
<p:blipFill><a:blip r:embed="rId{r_id}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>
<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{w}" cy="{h}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
            idx + 1
        ));
    }

    format!(
        r#"{XML_DECL}
<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}">
<p:cSld><p:spTree>{EMPTY_GROUP}
{shapes}
</p:spTree></p:cSld>
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sld>"#
    )
}

fn slide_layout_xml() -> String {
    format!(
        r#"{XML_DECL}
<p:sldLayout xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" type="blank" preserve="1">
<p:cSld name="Blank"><p:spTree>{EMPTY_GROUP}</p:spTree></p:cSld>
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sldLayout>"#
    )
}

fn slide_master_xml() -> String {
    format!(
        r#"{XML_DECL}
<p:sldMaster xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}">
<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>{EMPTY_GROUP}</p:spTree></p:cSld>
<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>
<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>
</p:sldMaster>"#
    )
}

fn master_rels_xml() -> String {
    format!(
        r#"{XML_DECL}
<Relationships xmlns="{NS_PKG_RELS}">
<Relationship Id="rId1" Type="{REL}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
<Relationship Id="rId2" Type="{REL}/theme" Target="../theme/theme1.xml"/>
</Relationships>"#
    )
}

/// Plain theme: the palette mirrors the chart colours, every style slot is a
/// solid fill or a thin line.
fn theme_xml() -> String {
    let colors = [
        ("dk1", "000000"),
        ("lt1", "FFFFFF"),
        ("dk2", "2C3E50"),
        ("lt2", "ECF0F1"),
        ("accent1", "3498DB"),
        ("accent2", "E74C3C"),
        ("accent3", "2ECC71"),
        ("accent4", "9B59B6"),
        ("accent5", "F39C12"),
        ("accent6", "1ABC9C"),
        ("hlink", "0563C1"),
        ("folHlink", "954F72"),
    ];
    let clr_scheme: String = colors
        .iter()
        .map(|(slot, hex)| format!(r#"<a:{slot}><a:srgbClr val="{hex}"/></a:{slot}>"#))
        .collect();

    let solid = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let fills = solid.repeat(3);
    let lines: String = [6350, 12700, 19050]
        .iter()
        .map(|w| format!(r#"<a:ln w="{w}">{solid}</a:ln>"#))
        .collect();
    let effects = "<a:effectStyle><a:effectLst/></a:effectStyle>".repeat(3);

    format!(
        r#"{XML_DECL}
<a:theme xmlns:a="{NS_A}" name="Sales Dashboard">
<a:themeElements>
<a:clrScheme name="Sales Dashboard">{clr_scheme}</a:clrScheme>
<a:fontScheme name="Sales Dashboard"><a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme>
<a:fmtScheme name="Sales Dashboard"><a:fillStyleLst>{fills}</a:fillStyleLst><a:lnStyleLst>{lines}</a:lnStyleLst><a:effectStyleLst>{effects}</a:effectStyleLst><a:bgFillStyleLst>{fills}</a:bgFillStyleLst></a:fmtScheme>
</a:themeElements>
</a:theme>"#
    )
}

fn core_props_xml(title: &str) -> String {
    let title = escape_xml(title);
    format!(
        r#"{XML_DECL}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/">
<dc:title>{title}</dc:title>
<dc:creator>Sales Dashboard</dc:creator>
</cp:coreProperties>"#
    )
}

fn app_props_xml(slide_count: usize) -> String {
    format!(
        r#"{XML_DECL}
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">
<Application>Sales Dashboard</Application>
<PresentationFormat>Widescreen</PresentationFormat>
<Slides>{slide_count}</Slides>
</Properties>"#
    )
}
