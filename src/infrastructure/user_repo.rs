use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::UserRepository;
use crate::domain::user::{NewUser, User};
use crate::schema::users;

use super::models::{NewUserRow, UserRow};

pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for DieselUserRepository {
    fn create(&self, user: NewUser, password_hash: String) -> Result<User, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(users::table)
            .values(&NewUserRow {
                id: Uuid::new_v4(),
                username: user.username,
                email: user.email,
                password: password_hash,
                admin: user.admin,
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn find_by_login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, DomainError> {
        if username.is_none() && email.is_none() {
            return Ok(None);
        }
        let mut conn = self.pool.get()?;

        let mut query = users::table
            .filter(users::deleted_at.is_null())
            .select(UserRow::as_select())
            .into_boxed();
        if let Some(username) = username {
            query = query.filter(users::username.eq(username));
        }
        if let Some(email) = email {
            query = query.filter(users::email.eq(email));
        }

        let row = query.first(&mut conn).optional()?;
        Ok(row.map(User::from))
    }

    fn password_hash(&self, user_id: Uuid) -> Result<Option<String>, DomainError> {
        let mut conn = self.pool.get()?;

        Ok(users::table
            .filter(users::id.eq(user_id))
            .filter(users::deleted_at.is_null())
            .select(users::password)
            .first(&mut conn)
            .optional()?)
    }
}
