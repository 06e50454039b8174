//! Element and attribute names of the Scribus `.sla` format.

/// Element names.
pub mod tag {
    pub const DOCUMENT: &str = "DOCUMENT";
    pub const PAGE: &str = "PAGE";
    pub const PAGEOBJECT: &str = "PAGEOBJECT";
    pub const ITEXT: &str = "ITEXT";
    pub const PARA: &str = "para";
    pub const TAB: &str = "tab";
    pub const BREAKLINE: &str = "breakline";
    pub const COLOR: &str = "COLOR";
    pub const JAVA: &str = "JAVA";
    pub const ITEM_ATTRIBUTE: &str = "ItemAttribute";
}

/// Attribute names.
pub mod attr {
    pub const VERSION: &str = "Version";
    // DOCUMENT
    pub const PAGE_COUNT: &str = "ANZPAGES";
    pub const PAGE_HEIGHT: &str = "PAGEHEIGHT";
    pub const GAP_VERTICAL: &str = "GapVertical";
    pub const GROUP_COUNT: &str = "GROUPC";
    pub const CONTRIBUTION: &str = "DOCCONTRIB";
    // PAGE
    pub const PAGE_Y: &str = "PAGEYPOS";
    pub const PAGE_NUMBER: &str = "NUM";
    // PAGEOBJECT
    pub const Y: &str = "YPOS";
    pub const OWN_PAGE: &str = "OwnPage";
    pub const ITEM_ID: &str = "ItemID";
    pub const NEXT_ITEM: &str = "NEXTITEM";
    pub const BACK_ITEM: &str = "BACKITEM";
    pub const GROUPS: &str = "GROUPS";
    pub const IMAGE_FILE: &str = "PFILE";
    // ITEXT
    pub const TEXT: &str = "CH";
    // ItemAttribute
    pub const NAME: &str = "Name";
    pub const VALUE: &str = "Value";
    pub const PARAMETER: &str = "Parameter";
    pub const RELATIONSHIP_TO: &str = "RelationshipTo";
    // JAVA
    pub const SCRIPT_NAME: &str = "NAME";
    pub const SCRIPT: &str = "SCRIPT";
}

/// `Parameter` value that turns an `ItemAttribute` into an attribute carrier.
pub const CARRIER_PARAMETER: &str = "SGAttribute";

/// Link value meaning "not linked".
pub const NO_LINK: i64 = -1;

/// The two families of the format that identify linked frames differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionFamily {
    /// `1.4.x`: links are positions in the page object list.
    Legacy14,
    /// Everything newer: links are `ItemID` values.
    Modern,
}

impl VersionFamily {
    pub fn from_version(version: &str) -> Self {
        if version.trim().starts_with("1.4") {
            VersionFamily::Legacy14
        } else {
            VersionFamily::Modern
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_family() {
        assert_eq!(VersionFamily::from_version("1.4.8"), VersionFamily::Legacy14);
        assert_eq!(VersionFamily::from_version("1.5.8"), VersionFamily::Modern);
        assert_eq!(VersionFamily::from_version("1.6.1"), VersionFamily::Modern);
        assert_eq!(VersionFamily::from_version(""), VersionFamily::Modern);
    }
}
