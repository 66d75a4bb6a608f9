//! Address repository for database operations.

use sqlx::PgPool;

use tradecart_core::{AccountId, AddressId};

use super::RepositoryError;
use crate::models::{Address, AddressPatch, NewAddress};

/// Internal row type for address queries.
#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: i32,
    account_id: Option<i32>,
    first_name: String,
    last_name: String,
    company: String,
    street1: String,
    street2: String,
    city: String,
    state: String,
    zip: String,
    country: String,
    email: String,
    phone: String,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: AddressId::new(row.id),
            account_id: row.account_id.map(AccountId::new),
            first_name: row.first_name,
            last_name: row.last_name,
            company: row.company,
            street1: row.street1,
            street2: row.street2,
            city: row.city,
            state: row.state,
            zip: row.zip,
            country: row.country,
            email: row.email,
            phone: row.phone,
        }
    }
}

const ADDRESS_COLUMNS: &str = "id, account_id, first_name, last_name, company, \
     street1, street2, city, state, zip, country, email, phone";

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert the all-empty placeholder row a draft order points at.
    ///
    /// Runs on the caller's executor so cart creation includes it in its
    /// own transaction. Exists purely to satisfy the NOT NULL
    /// `delivery_address_id` column; checkout replaces the reference with
    /// a real address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_placeholder<'e>(
        executor: impl sqlx::PgExecutor<'e>,
    ) -> Result<AddressId, RepositoryError> {
        let (id,): (i32,) = sqlx::query_as(
            r"
            INSERT INTO trade.address (account_id)
            VALUES (NULL)
            RETURNING id
            ",
        )
        .fetch_one(executor)
        .await?;

        Ok(AddressId::new(id))
    }

    /// Insert a new address on the caller's executor (checkout runs this
    /// inside its transaction).
    ///
    /// `account_id = Some(..)` saves it to the account's address book;
    /// `None` stores it as a one-off checkout address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create<'e>(
        executor: impl sqlx::PgExecutor<'e>,
        fields: &NewAddress,
        account_id: Option<AccountId>,
    ) -> Result<Address, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            r"
            INSERT INTO trade.address (
                account_id, first_name, last_name, company,
                street1, street2, city, state, zip, country, email, phone
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(account_id.as_ref().map(AccountId::as_i32))
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.company)
        .bind(&fields.street1)
        .bind(&fields.street2)
        .bind(&fields.city)
        .bind(&fields.state)
        .bind(&fields.zip)
        .bind(&fields.country)
        .bind(&fields.email)
        .bind(&fields.phone)
        .fetch_one(executor)
        .await?;

        Ok(row.into())
    }

    /// Get an address only if it belongs to the given account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_owned(
        &self,
        id: AddressId,
        account_id: AccountId,
    ) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            r"
            SELECT {ADDRESS_COLUMNS}
            FROM trade.address
            WHERE id = $1 AND account_id = $2
            "
        ))
        .bind(id.as_i32())
        .bind(account_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List the account's address book.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, AddressRow>(&format!(
            r"
            SELECT {ADDRESS_COLUMNS}
            FROM trade.address
            WHERE account_id = $1
            ORDER BY id
            "
        ))
        .bind(account_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Apply a partial update to an owned address.
    ///
    /// Absent patch fields keep their stored value (COALESCE). Returns
    /// `None` if the address does not exist or belongs to someone else.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_owned(
        &self,
        id: AddressId,
        account_id: AccountId,
        patch: &AddressPatch,
    ) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            r"
            UPDATE trade.address SET
                first_name = COALESCE($3, first_name),
                last_name  = COALESCE($4, last_name),
                company    = COALESCE($5, company),
                street1    = COALESCE($6, street1),
                street2    = COALESCE($7, street2),
                city       = COALESCE($8, city),
                state      = COALESCE($9, state),
                zip        = COALESCE($10, zip),
                country    = COALESCE($11, country),
                email      = COALESCE($12, email),
                phone      = COALESCE($13, phone)
            WHERE id = $1 AND account_id = $2
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(account_id.as_i32())
        .bind(patch.first_name.as_deref())
        .bind(patch.last_name.as_deref())
        .bind(patch.company.as_deref())
        .bind(patch.street1.as_deref())
        .bind(patch.street2.as_deref())
        .bind(patch.city.as_deref())
        .bind(patch.state.as_deref())
        .bind(patch.zip.as_deref())
        .bind(patch.country.as_deref())
        .bind(patch.email.as_deref())
        .bind(patch.phone.as_deref())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}
