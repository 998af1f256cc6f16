/// Reserved `file.*` properties. Anything else addresses front matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileProperty {
    Tags,
    Name,
    Path,
    Folder,
    Size,
    MTime,
    CTime,
    InFolder,
    Starred,
}

impl FileProperty {
    pub fn classify(property: &str) -> Option<Self> {
        let kind = match property {
            "file.hasTag" | "file.tag" | "file.tags" => FileProperty::Tags,
            "file.name" => FileProperty::Name,
            "file.path" => FileProperty::Path,
            "file.folder" => FileProperty::Folder,
            "file.size" => FileProperty::Size,
            "file.mtime" => FileProperty::MTime,
            "file.ctime" => FileProperty::CTime,
            "file.inFolder" => FileProperty::InFolder,
            "file.starred" => FileProperty::Starred,
            _ => return None,
        };
        Some(kind)
    }
}
