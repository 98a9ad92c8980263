/*
 *     Copyright (C) 2023  Fritz Ochsmann
 *
 *     This program is free software: you can redistribute it and/or modify
 *     it under the terms of the GNU Affero General Public License as published
 *     by the Free Software Foundation, either version 3 of the License, or
 *     (at your option) any later version.
 *
 *     This program is distributed in the hope that it will be useful,
 *     but WITHOUT ANY WARRANTY; without even the implied warranty of
 *     MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *     GNU Affero General Public License for more details.
 *
 *     You should have received a copy of the GNU Affero General Public License
 *     along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use crate::database::definitions::account::Account;
use crate::prelude::*;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

pub mod authz;
pub mod middleware;
pub mod token;

/// Hashes the given password into a salted PHC string.
#[instrument(skip_all)]
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

pub trait Authenticate {
    fn login(&self, password: &str) -> Result<()>;
}

impl Authenticate for Account {
    /// Compares the given password against the stored hash. A mismatch is
    /// indistinguishable from an unknown user at the route boundary.
    #[instrument(skip_all)]
    fn login(&self, password: &str) -> Result<()> {
        let hash = PasswordHash::new(self.password_hash().as_str())?;

        Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .map_err(|_| ApplicationError::Unauthorized)
    }
}
