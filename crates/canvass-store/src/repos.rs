//! Per-entity SQLite repositories.
//!
//! Each entity describes its table through [`SqlEntity`]; one blanket
//! [`Repo`] implementation on [`SqliteStore`] supplies the CRUD the engine
//! consumes. Rows map to the typed structs of `canvass_core::model`, never
//! to raw tuples.

use anyhow::{Context, Result};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use canvass_core::model::form::{
    Faq, FormOption, FormQuestion, InfoCard, QuestionKind, SliderLabel,
};
use canvass_core::model::image::ImageRef;
use canvass_core::model::testing::{
    Phase, Protocol, TestGroup, TestOption, TestQuestion, TestQuestionKind,
};
use canvass_core::reconcile::Tracked;
use canvass_core::store::{HasRepo, Repo};

/// SQLite-backed store implementing every engine seam.
pub struct SqliteStore {
    conn: Connection,
    image_root: PathBuf,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path`, storing image content
    /// under `image_root`.
    ///
    /// # Errors
    ///
    /// Returns an error when the database cannot be opened or migrated.
    pub fn open(db_path: &Path, image_root: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            conn: crate::db::open(db_path)?,
            image_root: image_root.into(),
        })
    }

    /// In-memory database; image content still lands under `image_root`.
    ///
    /// # Errors
    ///
    /// Returns an error when the database cannot be created or migrated.
    pub fn open_in_memory(image_root: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            conn: crate::db::open_in_memory()?,
            image_root: image_root.into(),
        })
    }

    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    #[must_use]
    pub fn image_root(&self) -> &Path {
        &self.image_root
    }
}

/// Table mapping for one entity type.
///
/// `SELECT` column order must line up with `from_row`; `INSERT` and
/// `UPDATE` placeholders with `insert_params`/`update_params`.
pub(crate) trait SqlEntity: Tracked {
    const TABLE: &'static str;
    const SELECT: &'static str;
    const PARENT_COL: Option<&'static str>;
    const INSERT: &'static str;
    const UPDATE: &'static str;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
    fn insert_params(&self) -> Vec<Value>;
    fn update_params(&self) -> Vec<Value>;
}

fn image_values(image: Option<&ImageRef>) -> [Value; 2] {
    image.map_or([Value::Null, Value::Null], |image| {
        [
            Value::Text(image.path.clone()),
            Value::Text(image.alt.clone()),
        ]
    })
}

fn image_from_row(row: &Row<'_>, index: usize) -> rusqlite::Result<Option<ImageRef>> {
    let path: Option<String> = row.get(index)?;
    let alt: Option<String> = row.get(index + 1)?;
    Ok(path.map(|path| ImageRef::new(path, alt.unwrap_or_default())))
}

fn kind_from_row<K: FromStr>(row: &Row<'_>, index: usize) -> rusqlite::Result<K> {
    let raw: String = row.get(index)?;
    raw.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            index,
            rusqlite::types::Type::Text,
            format!("invalid kind value: {raw}").into(),
        )
    })
}

impl<T: SqlEntity> Repo<T> for SqliteStore {
    fn find_all(&self, parent: Option<i64>) -> Result<Vec<T>> {
        let items = match (T::PARENT_COL, parent) {
            (Some(col), Some(parent_id)) => {
                let sql = format!("{} WHERE {col} = ?1 ORDER BY ord", T::SELECT);
                let mut stmt = self.conn.prepare(&sql)?;
                stmt.query_map(params![parent_id], T::from_row)?
                    .collect::<rusqlite::Result<Vec<T>>>()
            }
            _ => {
                let sql = format!("{} ORDER BY ord", T::SELECT);
                let mut stmt = self.conn.prepare(&sql)?;
                stmt.query_map([], T::from_row)?
                    .collect::<rusqlite::Result<Vec<T>>>()
            }
        };
        items.with_context(|| format!("load {} rows", T::TABLE))
    }

    fn find_by_id(&self, id: i64) -> Result<Option<T>> {
        let sql = format!("{} WHERE id = ?1", T::SELECT);
        self.conn
            .query_row(&sql, params![id], T::from_row)
            .optional()
            .with_context(|| format!("load {} {id}", T::TABLE))
    }

    fn save(&self, item: &mut T) -> Result<i64> {
        match item.id() {
            Some(id) => {
                self.conn
                    .execute(T::UPDATE, params_from_iter(item.update_params()))
                    .with_context(|| format!("update {} {id}", T::TABLE))?;
                Ok(id)
            }
            None => {
                self.conn
                    .execute(T::INSERT, params_from_iter(item.insert_params()))
                    .with_context(|| format!("insert into {}", T::TABLE))?;
                let id = self.conn.last_insert_rowid();
                item.set_id(id);
                Ok(id)
            }
        }
    }

    fn delete(&self, id: i64) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", T::TABLE);
        self.conn
            .execute(&sql, params![id])
            .with_context(|| format!("delete {} {id}", T::TABLE))?;
        Ok(())
    }
}

impl<T: SqlEntity> HasRepo<T> for SqliteStore {
    fn repo(&self) -> &dyn Repo<T> {
        self
    }
}

impl SqlEntity for Faq {
    const TABLE: &'static str = "faqs";
    const SELECT: &'static str =
        "SELECT id, ord, question, answer, image_path, image_alt FROM faqs";
    const PARENT_COL: Option<&'static str> = None;
    const INSERT: &'static str =
        "INSERT INTO faqs (ord, question, answer, image_path, image_alt)
         VALUES (?1, ?2, ?3, ?4, ?5)";
    const UPDATE: &'static str =
        "UPDATE faqs SET ord = ?1, question = ?2, answer = ?3, image_path = ?4, image_alt = ?5
         WHERE id = ?6";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            ord: row.get(1)?,
            question: row.get(2)?,
            answer: row.get(3)?,
            image: image_from_row(row, 4)?,
        })
    }

    fn insert_params(&self) -> Vec<Value> {
        let [path, alt] = image_values(self.image.as_ref());
        vec![
            Value::from(i64::from(self.ord)),
            Value::from(self.question.clone()),
            Value::from(self.answer.clone()),
            path,
            alt,
        ]
    }

    fn update_params(&self) -> Vec<Value> {
        let mut values = self.insert_params();
        values.push(Value::from(self.id.unwrap_or_default()));
        values
    }
}

impl SqlEntity for InfoCard {
    const TABLE: &'static str = "info_cards";
    const SELECT: &'static str =
        "SELECT id, ord, title, body, color, image_path, image_alt FROM info_cards";
    const PARENT_COL: Option<&'static str> = None;
    const INSERT: &'static str =
        "INSERT INTO info_cards (ord, title, body, color, image_path, image_alt)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
    const UPDATE: &'static str =
        "UPDATE info_cards SET ord = ?1, title = ?2, body = ?3, color = ?4,
                image_path = ?5, image_alt = ?6
         WHERE id = ?7";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            ord: row.get(1)?,
            title: row.get(2)?,
            body: row.get(3)?,
            color: row.get(4)?,
            image: image_from_row(row, 5)?,
        })
    }

    fn insert_params(&self) -> Vec<Value> {
        let [path, alt] = image_values(self.image.as_ref());
        vec![
            Value::from(i64::from(self.ord)),
            Value::from(self.title.clone()),
            Value::from(self.body.clone()),
            Value::from(i64::from(self.color)),
            path,
            alt,
        ]
    }

    fn update_params(&self) -> Vec<Value> {
        let mut values = self.insert_params();
        values.push(Value::from(self.id.unwrap_or_default()));
        values
    }
}

impl SqlEntity for FormQuestion {
    const TABLE: &'static str = "form_questions";
    const SELECT: &'static str = "SELECT id, form_id, ord, text, required, kind, slider_min,
                slider_max, image_path, image_alt FROM form_questions";
    const PARENT_COL: Option<&'static str> = Some("form_id");
    const INSERT: &'static str =
        "INSERT INTO form_questions (form_id, ord, text, required, kind, slider_min,
                slider_max, image_path, image_alt)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";
    const UPDATE: &'static str =
        "UPDATE form_questions SET form_id = ?1, ord = ?2, text = ?3, required = ?4,
                kind = ?5, slider_min = ?6, slider_max = ?7, image_path = ?8, image_alt = ?9
         WHERE id = ?10";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            form_id: row.get(1)?,
            ord: row.get(2)?,
            text: row.get(3)?,
            required: row.get(4)?,
            kind: kind_from_row::<QuestionKind>(row, 5)?,
            slider_min: row.get(6)?,
            slider_max: row.get(7)?,
            image: image_from_row(row, 8)?,
        })
    }

    fn insert_params(&self) -> Vec<Value> {
        let [path, alt] = image_values(self.image.as_ref());
        vec![
            Value::from(self.form_id),
            Value::from(i64::from(self.ord)),
            Value::from(self.text.clone()),
            Value::from(self.required),
            Value::from(self.kind.as_str().to_owned()),
            self.slider_min.map_or(Value::Null, |v| Value::from(i64::from(v))),
            self.slider_max.map_or(Value::Null, |v| Value::from(i64::from(v))),
            path,
            alt,
        ]
    }

    fn update_params(&self) -> Vec<Value> {
        let mut values = self.insert_params();
        values.push(Value::from(self.id.unwrap_or_default()));
        values
    }
}

impl SqlEntity for FormOption {
    const TABLE: &'static str = "form_options";
    const SELECT: &'static str =
        "SELECT id, question_id, ord, text, image_path, image_alt FROM form_options";
    const PARENT_COL: Option<&'static str> = Some("question_id");
    const INSERT: &'static str =
        "INSERT INTO form_options (question_id, ord, text, image_path, image_alt)
         VALUES (?1, ?2, ?3, ?4, ?5)";
    const UPDATE: &'static str =
        "UPDATE form_options SET question_id = ?1, ord = ?2, text = ?3,
                image_path = ?4, image_alt = ?5
         WHERE id = ?6";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            question_id: row.get(1)?,
            ord: row.get(2)?,
            text: row.get(3)?,
            image: image_from_row(row, 4)?,
        })
    }

    fn insert_params(&self) -> Vec<Value> {
        let [path, alt] = image_values(self.image.as_ref());
        vec![
            Value::from(self.question_id),
            Value::from(i64::from(self.ord)),
            Value::from(self.text.clone()),
            path,
            alt,
        ]
    }

    fn update_params(&self) -> Vec<Value> {
        let mut values = self.insert_params();
        values.push(Value::from(self.id.unwrap_or_default()));
        values
    }
}

impl SqlEntity for SliderLabel {
    const TABLE: &'static str = "slider_labels";
    const SELECT: &'static str =
        "SELECT id, question_id, ord, text, image_path, image_alt FROM slider_labels";
    const PARENT_COL: Option<&'static str> = Some("question_id");
    const INSERT: &'static str =
        "INSERT INTO slider_labels (question_id, ord, text, image_path, image_alt)
         VALUES (?1, ?2, ?3, ?4, ?5)";
    const UPDATE: &'static str =
        "UPDATE slider_labels SET question_id = ?1, ord = ?2, text = ?3,
                image_path = ?4, image_alt = ?5
         WHERE id = ?6";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            question_id: row.get(1)?,
            ord: row.get(2)?,
            text: row.get(3)?,
            image: image_from_row(row, 4)?,
        })
    }

    fn insert_params(&self) -> Vec<Value> {
        let [path, alt] = image_values(self.image.as_ref());
        vec![
            Value::from(self.question_id),
            Value::from(i64::from(self.ord)),
            Value::from(self.text.clone()),
            path,
            alt,
        ]
    }

    fn update_params(&self) -> Vec<Value> {
        let mut values = self.insert_params();
        values.push(Value::from(self.id.unwrap_or_default()));
        values
    }
}

impl SqlEntity for TestGroup {
    const TABLE: &'static str = "test_groups";
    const SELECT: &'static str =
        "SELECT id, ord, label, probability, image_path, image_alt FROM test_groups";
    const PARENT_COL: Option<&'static str> = None;
    const INSERT: &'static str =
        "INSERT INTO test_groups (ord, label, probability, image_path, image_alt)
         VALUES (?1, ?2, ?3, ?4, ?5)";
    const UPDATE: &'static str =
        "UPDATE test_groups SET ord = ?1, label = ?2, probability = ?3,
                image_path = ?4, image_alt = ?5
         WHERE id = ?6";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            ord: row.get(1)?,
            label: row.get(2)?,
            probability: row.get(3)?,
            image: image_from_row(row, 4)?,
        })
    }

    fn insert_params(&self) -> Vec<Value> {
        let [path, alt] = image_values(self.image.as_ref());
        vec![
            Value::from(i64::from(self.ord)),
            Value::from(self.label.clone()),
            Value::from(i64::from(self.probability)),
            path,
            alt,
        ]
    }

    fn update_params(&self) -> Vec<Value> {
        let mut values = self.insert_params();
        values.push(Value::from(self.id.unwrap_or_default()));
        values
    }
}

impl SqlEntity for Protocol {
    const TABLE: &'static str = "protocols";
    const SELECT: &'static str =
        "SELECT id, group_id, ord, name, summary, image_path, image_alt FROM protocols";
    const PARENT_COL: Option<&'static str> = Some("group_id");
    const INSERT: &'static str =
        "INSERT INTO protocols (group_id, ord, name, summary, image_path, image_alt)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
    const UPDATE: &'static str =
        "UPDATE protocols SET group_id = ?1, ord = ?2, name = ?3, summary = ?4,
                image_path = ?5, image_alt = ?6
         WHERE id = ?7";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            group_id: row.get(1)?,
            ord: row.get(2)?,
            name: row.get(3)?,
            summary: row.get(4)?,
            image: image_from_row(row, 5)?,
        })
    }

    fn insert_params(&self) -> Vec<Value> {
        let [path, alt] = image_values(self.image.as_ref());
        vec![
            Value::from(self.group_id),
            Value::from(i64::from(self.ord)),
            Value::from(self.name.clone()),
            Value::from(self.summary.clone()),
            path,
            alt,
        ]
    }

    fn update_params(&self) -> Vec<Value> {
        let mut values = self.insert_params();
        values.push(Value::from(self.id.unwrap_or_default()));
        values
    }
}

impl SqlEntity for Phase {
    const TABLE: &'static str = "phases";
    const SELECT: &'static str =
        "SELECT id, protocol_id, ord, title, duration_days, image_path, image_alt FROM phases";
    const PARENT_COL: Option<&'static str> = Some("protocol_id");
    const INSERT: &'static str =
        "INSERT INTO phases (protocol_id, ord, title, duration_days, image_path, image_alt)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
    const UPDATE: &'static str =
        "UPDATE phases SET protocol_id = ?1, ord = ?2, title = ?3, duration_days = ?4,
                image_path = ?5, image_alt = ?6
         WHERE id = ?7";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            protocol_id: row.get(1)?,
            ord: row.get(2)?,
            title: row.get(3)?,
            duration_days: row.get(4)?,
            image: image_from_row(row, 5)?,
        })
    }

    fn insert_params(&self) -> Vec<Value> {
        let [path, alt] = image_values(self.image.as_ref());
        vec![
            Value::from(self.protocol_id),
            Value::from(i64::from(self.ord)),
            Value::from(self.title.clone()),
            self.duration_days
                .map_or(Value::Null, |v| Value::from(i64::from(v))),
            path,
            alt,
        ]
    }

    fn update_params(&self) -> Vec<Value> {
        let mut values = self.insert_params();
        values.push(Value::from(self.id.unwrap_or_default()));
        values
    }
}

impl SqlEntity for TestQuestion {
    const TABLE: &'static str = "test_questions";
    const SELECT: &'static str =
        "SELECT id, phase_id, ord, text, required, kind, image_path, image_alt FROM test_questions";
    const PARENT_COL: Option<&'static str> = Some("phase_id");
    const INSERT: &'static str =
        "INSERT INTO test_questions (phase_id, ord, text, required, kind, image_path, image_alt)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";
    const UPDATE: &'static str =
        "UPDATE test_questions SET phase_id = ?1, ord = ?2, text = ?3, required = ?4,
                kind = ?5, image_path = ?6, image_alt = ?7
         WHERE id = ?8";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            phase_id: row.get(1)?,
            ord: row.get(2)?,
            text: row.get(3)?,
            required: row.get(4)?,
            kind: kind_from_row::<TestQuestionKind>(row, 5)?,
            image: image_from_row(row, 6)?,
        })
    }

    fn insert_params(&self) -> Vec<Value> {
        let [path, alt] = image_values(self.image.as_ref());
        vec![
            Value::from(self.phase_id),
            Value::from(i64::from(self.ord)),
            Value::from(self.text.clone()),
            Value::from(self.required),
            Value::from(self.kind.as_str().to_owned()),
            path,
            alt,
        ]
    }

    fn update_params(&self) -> Vec<Value> {
        let mut values = self.insert_params();
        values.push(Value::from(self.id.unwrap_or_default()));
        values
    }
}

impl SqlEntity for TestOption {
    const TABLE: &'static str = "test_options";
    const SELECT: &'static str =
        "SELECT id, question_id, ord, text, image_path, image_alt FROM test_options";
    const PARENT_COL: Option<&'static str> = Some("question_id");
    const INSERT: &'static str =
        "INSERT INTO test_options (question_id, ord, text, image_path, image_alt)
         VALUES (?1, ?2, ?3, ?4, ?5)";
    const UPDATE: &'static str =
        "UPDATE test_options SET question_id = ?1, ord = ?2, text = ?3,
                image_path = ?4, image_alt = ?5
         WHERE id = ?6";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            question_id: row.get(1)?,
            ord: row.get(2)?,
            text: row.get(3)?,
            image: image_from_row(row, 4)?,
        })
    }

    fn insert_params(&self) -> Vec<Value> {
        let [path, alt] = image_values(self.image.as_ref());
        vec![
            Value::from(self.question_id),
            Value::from(i64::from(self.ord)),
            Value::from(self.text.clone()),
            path,
            alt,
        ]
    }

    fn update_params(&self) -> Vec<Value> {
        let mut values = self.insert_params();
        values.push(Value::from(self.id.unwrap_or_default()));
        values
    }
}
