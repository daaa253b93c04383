//! Static entity catalog: the six record types, their tables, columns,
//! designated search field, and validation rules. Handlers resolve an entity
//! by its URL path segment; the SQL builder and validator are driven entirely
//! by this metadata, so identifiers never come from request input.

/// How values of a column are cast when bound (`$n::bigint` / `$n::text`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    BigInt,
    Text,
    Timestamp,
}

#[derive(Clone, Copy, Debug)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnKind,
}

/// Designated list filter for an entity.
#[derive(Clone, Copy, Debug)]
pub enum Search {
    /// Case-insensitive substring match on a text column.
    Substring(&'static str),
    /// Exact match on a numeric foreign-key column.
    Exact(&'static str),
}

#[derive(Clone, Copy, Debug)]
pub enum FieldKind {
    Text { max_len: Option<usize> },
    Id,
}

/// One writable field with its validation rule. Fields not listed here are
/// ignored on create/update (fillable-set semantics).
#[derive(Clone, Copy, Debug)]
pub struct FieldRule {
    pub field: &'static str,
    pub required: bool,
    pub kind: FieldKind,
}

#[derive(Clone, Copy, Debug)]
pub struct EntityDef {
    /// URL path segment, e.g. `libros`.
    pub path: &'static str,
    pub table: &'static str,
    /// Human-readable label used in confirmation messages.
    pub label: &'static str,
    /// Full column set in SELECT order (id first, timestamps last).
    pub columns: &'static [ColumnDef],
    pub search: Search,
    pub rules: &'static [FieldRule],
}

const fn id_col() -> ColumnDef {
    ColumnDef { name: "id", kind: ColumnKind::BigInt }
}

const fn text_col(name: &'static str) -> ColumnDef {
    ColumnDef { name, kind: ColumnKind::Text }
}

const fn fk_col(name: &'static str) -> ColumnDef {
    ColumnDef { name, kind: ColumnKind::BigInt }
}

const fn ts_col(name: &'static str) -> ColumnDef {
    ColumnDef { name, kind: ColumnKind::Timestamp }
}

const fn text_rule(field: &'static str, max_len: Option<usize>) -> FieldRule {
    FieldRule { field, required: true, kind: FieldKind::Text { max_len } }
}

const fn id_rule(field: &'static str) -> FieldRule {
    FieldRule { field, required: true, kind: FieldKind::Id }
}

pub const AUTHOR: EntityDef = EntityDef {
    path: "autors",
    table: "authors",
    label: "Author",
    columns: &[id_col(), text_col("name"), ts_col("created_at"), ts_col("updated_at")],
    search: Search::Substring("name"),
    rules: &[text_rule("name", Some(255))],
};

pub const CATEGORY: EntityDef = EntityDef {
    path: "categorias",
    table: "categories",
    label: "Category",
    columns: &[
        id_col(),
        text_col("name"),
        text_col("code"),
        ts_col("created_at"),
        ts_col("updated_at"),
    ],
    search: Search::Substring("name"),
    rules: &[text_rule("name", Some(255)), text_rule("code", None)],
};

pub const PERSON: EntityDef = EntityDef {
    path: "personas",
    table: "persons",
    label: "Person",
    columns: &[
        id_col(),
        text_col("name"),
        text_col("code"),
        ts_col("created_at"),
        ts_col("updated_at"),
    ],
    search: Search::Substring("name"),
    rules: &[text_rule("name", Some(255)), text_rule("code", None)],
};

pub const LOCATION: EntityDef = EntityDef {
    path: "ubicacions",
    table: "locations",
    label: "Location",
    columns: &[
        id_col(),
        text_col("shelf"),
        text_col("row"),
        text_col("column"),
        ts_col("created_at"),
        ts_col("updated_at"),
    ],
    search: Search::Substring("shelf"),
    rules: &[
        text_rule("shelf", Some(255)),
        text_rule("row", None),
        text_rule("column", None),
    ],
};

pub const BOOK: EntityDef = EntityDef {
    path: "libros",
    table: "books",
    label: "Book",
    columns: &[
        id_col(),
        text_col("title"),
        text_col("description"),
        fk_col("author_id"),
        fk_col("location_id"),
        fk_col("category_id"),
        ts_col("created_at"),
        ts_col("updated_at"),
    ],
    search: Search::Substring("title"),
    rules: &[
        text_rule("title", Some(255)),
        text_rule("description", None),
        id_rule("author_id"),
        id_rule("location_id"),
        id_rule("category_id"),
    ],
};

pub const LOAN: EntityDef = EntityDef {
    path: "prestamoLibros",
    table: "loans",
    label: "Loan",
    columns: &[
        id_col(),
        fk_col("book_id"),
        fk_col("person_id"),
        ts_col("created_at"),
        ts_col("updated_at"),
    ],
    search: Search::Exact("book_id"),
    rules: &[id_rule("book_id"), id_rule("person_id")],
};

/// All entities, in foreign-key dependency order (parents before children),
/// which is also the order tables are created in.
pub const ENTITIES: &[EntityDef] = &[AUTHOR, CATEGORY, PERSON, LOCATION, BOOK, LOAN];

/// Resolve an entity by its URL path segment.
pub fn by_path(segment: &str) -> Option<&'static EntityDef> {
    ENTITIES.iter().find(|e| e.path == segment)
}

impl EntityDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }
}
