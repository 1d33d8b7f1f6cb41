//! The Active Record trait.

use quarry_core::{Entity, Param, SqlValue, ToSqlValue};
use quarry_db::Database;
use tokio::sync::MutexGuard;
use tracing::debug;

use crate::error::{RecordError, Result};
use crate::handle::Db;

/// An [`Entity`] that loads and stores itself through an injected [`Db`].
///
/// Implement [`db`](Self::db) and [`set_db`](Self::set_db), usually by
/// marking a field `#[record(db)]` under `#[derive(Record)]`; every other
/// method has a default implementation. Without an injected handle each
/// method fails with [`RecordError::Configuration`].
///
/// Table names get the database's table prefix. Conditions are raw SQL
/// with `?` placeholders.
#[allow(async_fn_in_trait)]
pub trait ActiveRecord: Entity + Default {
    /// Returns the database handle.
    fn db(&self) -> Option<&Db>;

    /// Injects the database handle.
    fn set_db(&mut self, db: Db);

    /// Loads the first row where `column = value` into this record.
    /// Returns `false` when no row matches.
    async fn find(&mut self, column: &str, value: impl ToSqlValue) -> Result<bool> {
        self.find_where(&format!("{column} = ?"), vec![Param::Scalar(value.to_sql_value())])
            .await
    }

    /// Loads the row with the given id, or with this record's own id when
    /// `id` is `None`.
    async fn find_by_id(&mut self, id: Option<SqlValue>) -> Result<bool> {
        let id = id.unwrap_or_else(|| self.id_value());
        self.find(Self::ID_COLUMN, id).await
    }

    /// Loads the first row matching `condition` into this record.
    async fn find_where(&mut self, condition: &str, params: Vec<Param>) -> Result<bool> {
        let handle = handle(self)?;
        let mut db = connected(&handle).await?;

        let query = db.builder().select_all().from(Self::TABLE).where_clause(condition);
        Ok(db.execute(query, params).await?.fetch_into(self)?)
    }

    /// Loads every row of the table.
    async fn find_all(&self) -> Result<Vec<Self>> {
        let handle = handle(self)?;
        let mut db = connected(&handle).await?;

        let query = db.builder().select_all().from(Self::TABLE);
        let records: Vec<Self> = db.execute(query, vec![]).await?.fetch_all_as()?;
        Ok(with_handle(records, &handle))
    }

    /// Loads every row matching `condition`, binding one scalar or list
    /// parameter.
    async fn find_all_where(&self, condition: &str, value: impl Into<Param>) -> Result<Vec<Self>> {
        let handle = handle(self)?;
        let mut db = connected(&handle).await?;

        let query = db.builder().select_all().from(Self::TABLE).where_clause(condition);
        let records: Vec<Self> = db.execute(query, vec![value.into()]).await?.fetch_all_as()?;
        Ok(with_handle(records, &handle))
    }

    /// Inserts this record when its id is NULL, updates it otherwise.
    ///
    /// After an insert the id holds the new row's id.
    async fn save(&mut self) -> Result<()> {
        let handle = handle(self)?;
        let mut db = connected(&handle).await?;

        let (columns, mut params) = split_data(self);
        let id = self.id_value();

        if id.is_null() {
            let query = db.builder().insert(Self::TABLE, columns, None)?;
            db.execute(query, params).await?;
            let id = db.last_insert_id()?;
            debug!(table = Self::TABLE, id, "Inserted record");
            self.set_id_value(SqlValue::Int(id))?;
        } else {
            let query = db
                .builder()
                .update(Self::TABLE, columns, None)?
                .where_clause(&format!("{} = ?", Self::ID_COLUMN));
            params.push(Param::Scalar(id));
            db.execute(query, params).await?;
        }
        Ok(())
    }

    /// Updates every row matching `condition` with this record's values.
    ///
    /// `params` bind the placeholders of `condition`.
    async fn save_where(&mut self, condition: &str, params: Vec<Param>) -> Result<()> {
        let handle = handle(self)?;
        let mut db = connected(&handle).await?;

        let (columns, mut values) = split_data(self);
        let query = db
            .builder()
            .update(Self::TABLE, columns, None)?
            .where_clause(condition);
        values.extend(params);
        db.execute(query, values).await?;
        Ok(())
    }

    /// Deletes the row with the given id, or with this record's own id when
    /// `id` is `None`. The record's id is NULL afterwards.
    async fn delete(&mut self, id: Option<SqlValue>) -> Result<()> {
        let id = id.unwrap_or_else(|| self.id_value());
        self.delete_where(&format!("{} = ?", Self::ID_COLUMN), vec![Param::Scalar(id)])
            .await?;
        self.set_id_value(SqlValue::Null)?;
        Ok(())
    }

    /// Deletes every row matching `condition`.
    async fn delete_where(&self, condition: &str, params: Vec<Param>) -> Result<()> {
        let handle = handle(self)?;
        let mut db = connected(&handle).await?;

        let query = db.builder().delete_from(Self::TABLE, Some(condition));
        db.execute(query, params).await?;
        Ok(())
    }
}

fn handle<T: ActiveRecord>(record: &T) -> Result<Db> {
    record.db().cloned().ok_or(RecordError::Configuration)
}

async fn connected(handle: &Db) -> Result<MutexGuard<'_, Database>> {
    let mut db = handle.lock().await;
    db.connect().await?;
    Ok(db)
}

/// Column names and values of every field except the id.
fn split_data<T: Entity>(record: &T) -> (Vec<&'static str>, Vec<Param>) {
    record
        .data_values()
        .into_iter()
        .map(|(column, value)| (column, Param::Scalar(value)))
        .unzip()
}

fn with_handle<T: ActiveRecord>(mut records: Vec<T>, handle: &Db) -> Vec<T> {
    for record in &mut records {
        record.set_db(handle.clone());
    }
    records
}
