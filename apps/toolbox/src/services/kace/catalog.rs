//! Catalog of KACE custom inventory rule predicates.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    File,
    Registry,
    Environment,
    Filename,
    Plist,
    Shell,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::File,
        Category::Registry,
        Category::Environment,
        Category::Filename,
        Category::Plist,
        Category::Shell,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Registry => "Registry",
            Self::Environment => "Environment variable",
            Self::Filename => "Filename regex",
            Self::Plist => "Plist (macOS)",
            Self::Shell => "Shell command",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Text,
    Path,
    RegistryKey,
    Version,
    /// `MM/DD/YYYY HH:MM:SS`
    Timestamp,
    Regex,
    Choice(&'static [&'static str]),
}

#[derive(Clone, Copy, Debug)]
pub struct ParamDef {
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub kind: ParamKind,
    pub placeholder: &'static str,
}

impl ParamDef {
    /// Initial value for a freshly added condition.
    pub fn default_value(&self) -> &'static str {
        match self.kind {
            ParamKind::Choice(options) => options.first().copied().unwrap_or(""),
            _ => "",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FunctionDef {
    pub key: &'static str,
    pub category: Category,
    pub description: &'static str,
    pub params: &'static [ParamDef],
}

impl PartialEq for FunctionDef {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl FunctionDef {
    pub fn param(&self, name: &str) -> Option<&ParamDef> {
        self.params.iter().find(|param| param.name == name)
    }
}

pub const RETURN_TYPES: &[&str] = &["TEXT", "NUMBER", "DATE"];

pub const FILE_ATTRIBUTES: &[&str] = &[
    "FileVersion",
    "ProductVersion",
    "ProductName",
    "CompanyName",
    "FileDescription",
    "InternalName",
    "OriginalFilename",
    "LegalCopyright",
    "Comments",
    "FileSize",
    "CreatedDate",
    "ModifiedDate",
    "AccessedDate",
];

const PATH: ParamDef = ParamDef {
    name: "path",
    label: "Path",
    required: true,
    kind: ParamKind::Path,
    placeholder: r"C:\Path\To\File.exe",
};

const VERSION: ParamDef = ParamDef {
    name: "version",
    label: "Version",
    required: true,
    kind: ParamKind::Version,
    placeholder: "1.0.0.0",
};

const TIMESTAMP: ParamDef = ParamDef {
    name: "timestamp",
    label: "Timestamp",
    required: true,
    kind: ParamKind::Timestamp,
    placeholder: "01/31/2024 13:45:00",
};

const ATTRIBUTE: ParamDef = ParamDef {
    name: "attribute",
    label: "Attribute",
    required: true,
    kind: ParamKind::Choice(FILE_ATTRIBUTES),
    placeholder: "",
};

const RETURN_TYPE: ParamDef = ParamDef {
    name: "type",
    label: "Return type",
    required: true,
    kind: ParamKind::Choice(RETURN_TYPES),
    placeholder: "",
};

const REG_KEY: ParamDef = ParamDef {
    name: "key",
    label: "Registry key",
    required: true,
    kind: ParamKind::RegistryKey,
    placeholder: r"HKEY_LOCAL_MACHINE\Software\Vendor",
};

const REG_VALUE_NAME: ParamDef = ParamDef {
    name: "name",
    label: "Value name",
    required: true,
    kind: ParamKind::Text,
    placeholder: "DisplayVersion",
};

// A blank value name targets the key's (Default) value.
const REG_VALUE_NAME_OPTIONAL: ParamDef = ParamDef {
    required: false,
    placeholder: "(Default)",
    ..REG_VALUE_NAME
};

const VALUE: ParamDef = ParamDef {
    name: "value",
    label: "Value",
    required: true,
    kind: ParamKind::Text,
    placeholder: "",
};

const VAR: ParamDef = ParamDef {
    name: "variable",
    label: "Variable",
    required: true,
    kind: ParamKind::Text,
    placeholder: "PATH",
};

const DIRECTORY: ParamDef = ParamDef {
    name: "path",
    label: "Directory",
    required: true,
    kind: ParamKind::Path,
    placeholder: r"C:\Program Files\Vendor",
};

const REGEX: ParamDef = ParamDef {
    name: "regex",
    label: "Filename regex",
    required: true,
    kind: ParamKind::Regex,
    placeholder: r".*\.log",
};

const PLIST_FILE: ParamDef = ParamDef {
    name: "file",
    label: "Plist file",
    required: true,
    kind: ParamKind::Path,
    placeholder: "/Applications/App.app/Contents/Info.plist",
};

const PLIST_ENTRY: ParamDef = ParamDef {
    name: "entry",
    label: "Entry",
    required: true,
    kind: ParamKind::Text,
    placeholder: "CFBundleShortVersionString",
};

const COMMAND: ParamDef = ParamDef {
    name: "command",
    label: "Command",
    required: true,
    kind: ParamKind::Text,
    placeholder: "cmd /c ver",
};

macro_rules! function {
    ($key:literal, $category:ident, $description:literal, [$($param:expr),* $(,)?]) => {
        FunctionDef {
            key: $key,
            category: Category::$category,
            description: $description,
            params: &[$($param),*],
        }
    };
}

pub static CATALOG: &[FunctionDef] = &[
    function!("FileExists", File, "True when the file exists.", [PATH]),
    function!("FileVersionEquals", File, "File version equals the value.", [PATH, VERSION]),
    function!("FileVersionLessThan", File, "File version is lower than the value.", [PATH, VERSION]),
    function!("FileVersionGreaterThan", File, "File version is higher than the value.", [PATH, VERSION]),
    function!("ProductVersionEquals", File, "Product version equals the value.", [PATH, VERSION]),
    function!("ProductVersionLessThan", File, "Product version is lower than the value.", [PATH, VERSION]),
    function!("ProductVersionGreaterThan", File, "Product version is higher than the value.", [PATH, VERSION]),
    function!("FileTimestampEquals", File, "File modification time equals the timestamp.", [PATH, TIMESTAMP]),
    function!("FileTimestampLessThan", File, "File was modified before the timestamp.", [PATH, TIMESTAMP]),
    function!("FileTimestampGreaterThan", File, "File was modified after the timestamp.", [PATH, TIMESTAMP]),
    function!("FileInfoReturn", File, "Reports a file attribute as inventory.", [PATH, ATTRIBUTE, RETURN_TYPE]),
    function!("RegistryKeyExists", Registry, "True when the registry key exists.", [REG_KEY]),
    function!("RegistryValueEquals", Registry, "Registry value equals the value.", [REG_KEY, REG_VALUE_NAME, VALUE]),
    function!("RegistryValueLessThan", Registry, "Registry value is lower than the value.", [REG_KEY, REG_VALUE_NAME, VALUE]),
    function!("RegistryValueGreaterThan", Registry, "Registry value is higher than the value.", [REG_KEY, REG_VALUE_NAME, VALUE]),
    function!("RegistryValueContains", Registry, "Registry value contains the text.", [REG_KEY, REG_VALUE_NAME, VALUE]),
    function!("RegistryValueReturn", Registry, "Reports a registry value as inventory.", [REG_KEY, REG_VALUE_NAME_OPTIONAL, RETURN_TYPE]),
    function!("EnvironmentalVariableExists", Environment, "True when the variable is defined.", [VAR]),
    function!("EnvironmentalVariableEquals", Environment, "Variable equals the value.", [VAR, VALUE]),
    function!("EnvironmentalVariableLessThan", Environment, "Variable is lower than the value.", [VAR, VALUE]),
    function!("EnvironmentalVariableGreaterThan", Environment, "Variable is higher than the value.", [VAR, VALUE]),
    function!("EnvironmentalVariableReturn", Environment, "Reports a variable as inventory.", [VAR, RETURN_TYPE]),
    function!("FilenamesMatchingRegexExist", Filename, "True when any file in the directory matches.", [DIRECTORY, REGEX]),
    function!("FilenamesMatchingRegexEqual", Filename, "Count of matching files equals the value.", [DIRECTORY, REGEX, VALUE]),
    function!("FilenamesMatchingRegexLessThan", Filename, "Count of matching files is lower than the value.", [DIRECTORY, REGEX, VALUE]),
    function!("FilenamesMatchingRegexGreaterThan", Filename, "Count of matching files is higher than the value.", [DIRECTORY, REGEX, VALUE]),
    function!("FilenamesMatchingRegexReturn", Filename, "Reports matching filenames as inventory.", [DIRECTORY, REGEX, RETURN_TYPE]),
    function!("PlistValueExists", Plist, "True when the plist entry exists.", [PLIST_FILE, PLIST_ENTRY]),
    function!("PlistValueEquals", Plist, "Plist entry equals the value.", [PLIST_FILE, PLIST_ENTRY, VALUE]),
    function!("PlistValueLessThan", Plist, "Plist entry is lower than the value.", [PLIST_FILE, PLIST_ENTRY, VALUE]),
    function!("PlistValueGreaterThan", Plist, "Plist entry is higher than the value.", [PLIST_FILE, PLIST_ENTRY, VALUE]),
    function!("PlistValueReturn", Plist, "Reports a plist entry as inventory.", [PLIST_FILE, PLIST_ENTRY, RETURN_TYPE]),
    function!("ShellCommandTextReturn", Shell, "Reports command output as text.", [COMMAND]),
    function!("ShellCommandNumberReturn", Shell, "Reports command output as a number.", [COMMAND]),
    function!("ShellCommandDateReturn", Shell, "Reports command output as a date.", [COMMAND]),
];

pub fn lookup(key: &str) -> Option<&'static FunctionDef> {
    CATALOG.iter().find(|def| def.key == key)
}

pub fn by_category(category: Category) -> impl Iterator<Item = &'static FunctionDef> {
    CATALOG.iter().filter(move |def| def.category == category)
}

pub fn default_function() -> &'static FunctionDef {
    &CATALOG[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique() {
        let keys: HashSet<_> = CATALOG.iter().map(|def| def.key).collect();
        assert_eq!(keys.len(), CATALOG.len());
        assert_eq!(CATALOG.len(), 35);
    }

    #[test]
    fn every_category_has_functions() {
        for category in Category::ALL {
            assert!(by_category(category).next().is_some(), "{category:?}");
        }
    }

    #[test]
    fn choice_params_default_to_first_option() {
        let def = lookup("FileInfoReturn").unwrap();
        assert_eq!(def.param("attribute").unwrap().default_value(), "FileVersion");
        assert_eq!(def.param("type").unwrap().default_value(), "TEXT");
        assert_eq!(def.param("path").unwrap().default_value(), "");
    }
}
