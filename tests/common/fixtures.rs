//! Builders for small `.sla` templates and data files.

pub const MODERN_VERSION: &str = "1.5.8";
pub const LEGACY_VERSION: &str = "1.4.6";

pub const PAGE_HEIGHT: f64 = 842.0;
pub const GAP: f64 = 40.0;

/// A complete template document. `body` goes inside `DOCUMENT`.
pub fn sla(version: &str, pages: usize, body: &str) -> String {
    let root = if version.starts_with("1.4") {
        "SCRIBUSUTF8"
    } else {
        "SCRIBUSUTF8NEW"
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<{root} Version="{version}">
<DOCUMENT ANZPAGES="{pages}" PAGEWIDTH="595" PAGEHEIGHT="{PAGE_HEIGHT}" GapVertical="{GAP}" GROUPC="1" DOCCONTRIB="">
<COLOR NAME="Black" SPACE="CMYK" C="0" M="0" Y="0" K="100"/>
<COLOR NAME="%VAR_name%" SPACE="RGB"/>
{body}
</DOCUMENT>
</{root}>
"#
    )
}

pub fn page(num: usize) -> String {
    let y = 20.0 + num as f64 * (PAGE_HEIGHT + GAP);
    format!(r#"<PAGE NUM="{num}" PAGEXPOS="100" PAGEYPOS="{y}"/>"#)
}

/// A text frame with a single text run.
pub fn text_frame(id: i64, page: usize, text: &str) -> String {
    linked_text_frame(id, page, -1, -1, text)
}

pub fn linked_text_frame(id: i64, page: usize, next: i64, back: i64, text: &str) -> String {
    let y = 120.0 + page as f64 * (PAGE_HEIGHT + GAP);
    format!(
        r#"<PAGEOBJECT ItemID="{id}" PTYPE="4" XPOS="150" YPOS="{y}" OwnPage="{page}" NEXTITEM="{next}" BACKITEM="{back}">
<StoryText><DefaultStyle/><ITEXT CH="{text}"/><para/><trail/></StoryText>
</PAGEOBJECT>"#
    )
}

/// An image frame referencing `file`.
pub fn image_frame(id: i64, page: usize, file: &str) -> String {
    format!(
        r#"<PAGEOBJECT ItemID="{id}" PTYPE="2" YPOS="300" OwnPage="{page}" PFILE="{file}" NEXTITEM="-1" BACKITEM="-1"/>"#
    )
}

/// A frame carrying an attribute overwrite.
pub fn carrier_frame(id: i64, name: &str, value: &str, reference: &str) -> String {
    format!(
        r#"<PAGEOBJECT ItemID="{id}" YPOS="500" OwnPage="0" FCOLOR="Black" NEXTITEM="-1" BACKITEM="-1">
<ItemAttribute Name="{name}" Type="none" Value="{value}" Parameter="SGAttribute" Relationship="none" RelationshipTo="{reference}"/>
</PAGEOBJECT>"#
    )
}

/// The usual one-page card: name and email in one text frame.
pub fn card_template() -> String {
    sla(
        MODERN_VERSION,
        1,
        &format!(
            "{}\n{}",
            page(0),
            text_frame(101, 0, "%VAR_name% &lt;%VAR_email%&gt;")
        ),
    )
}

/// A delimited data file.
pub fn csv(header: &[&str], rows: &[&[&str]], delimiter: char) -> String {
    let sep = delimiter.to_string();
    let mut out = header.join(&sep);
    out.push('\n');
    for row in rows {
        out.push_str(&row.join(&sep));
        out.push('\n');
    }
    out
}
