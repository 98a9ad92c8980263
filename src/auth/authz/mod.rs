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

use crate::auth::token::AuthClaims;
use crate::database::definitions::task::Task;

/// The creator, the assignee and admins may edit a task.
pub fn can_edit(task: &Task, actor: &AuthClaims) -> bool {
    *task.created_by_id() == actor.user_id()
        || *task.assigned_to_id() == Some(actor.user_id())
        || actor.is_admin()
}

/// Deletion is narrower than editing: only the creator and admins,
/// assignment grants no right here.
pub fn can_delete(task: &Task, actor: &AuthClaims) -> bool {
    *task.created_by_id() == actor.user_id() || actor.is_admin()
}
