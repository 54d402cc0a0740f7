#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    CatalogParse,
    CatalogWrite,
    CatalogValidate,
    CatalogCompare,
    CatalogSync,
    CatalogFill,
    CatalogLookup,
    DetectEncoding,
    ProjectList,
    ProjectCreate,
    ProjectOpen,
    ProjectSave,
    ProjectValidate,
    ProjectLookup,
    ProjectSync,
    ProjectFill,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "catalog.parse" => Command::CatalogParse,
            "catalog.write" => Command::CatalogWrite,
            "catalog.validate" => Command::CatalogValidate,
            "catalog.compare" => Command::CatalogCompare,
            "catalog.sync" => Command::CatalogSync,
            "catalog.fill" => Command::CatalogFill,
            "catalog.lookup" => Command::CatalogLookup,
            "encoding.detect" => Command::DetectEncoding,
            "project.list" => Command::ProjectList,
            "project.create" => Command::ProjectCreate,
            "project.open" => Command::ProjectOpen,
            "project.save" => Command::ProjectSave,
            "project.validate" => Command::ProjectValidate,
            "project.lookup" => Command::ProjectLookup,
            "project.sync" => Command::ProjectSync,
            "project.fill" => Command::ProjectFill,
            _ => Command::Unknown,
        }
    }
}
