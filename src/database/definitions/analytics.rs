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

use crate::database::definitions::task::{TaskPriority, TaskStatus};
use crate::prelude::*;
use chrono::NaiveDate;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Getters, sqlx::FromRow)]
#[get = "pub"]
pub struct StatusStat {
    status: TaskStatus,
    count: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Getters, sqlx::FromRow)]
#[get = "pub"]
pub struct PriorityStat {
    priority: TaskPriority,
    count: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Getters, sqlx::FromRow)]
#[get = "pub"]
pub struct DailyCount {
    date: NaiveDate,
    count: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Getters, sqlx::FromRow)]
#[get = "pub"]
pub struct UserStat {
    username: String,
    task_count: i64,
}

/// The aggregate view over the task store. Computed fresh on every request,
/// there is no caching layer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Getters)]
#[serde(rename_all = "camelCase")]
#[get = "pub"]
pub struct Analytics {
    status_stats: Vec<StatusStat>,
    priority_stats: Vec<PriorityStat>,
    /// daily creation counts of the trailing seven days, days without any
    /// created task are absent
    tasks_over_time: Vec<DailyCount>,
    user_stats: Vec<UserStat>,
    overdue_count: i64,
    completion_rate: f64,
}

impl Analytics {
    #[instrument(skip_all)]
    pub async fn compute(connection: &DatabaseConnection) -> Result<Self> {
        let status_stats = sqlx::query_as::<_, StatusStat>(
            "SELECT status, COUNT(*) AS count FROM tasks GROUP BY status",
        )
        .fetch_all(connection)
        .await?;

        let priority_stats = sqlx::query_as::<_, PriorityStat>(
            "SELECT priority, COUNT(*) AS count FROM tasks GROUP BY priority",
        )
        .fetch_all(connection)
        .await?;

        let tasks_over_time = sqlx::query_as::<_, DailyCount>(
            "SELECT date(created_at) AS date, COUNT(*) AS count FROM tasks \
             WHERE date(created_at) >= date('now', '-6 days') \
             GROUP BY date(created_at) \
             ORDER BY date",
        )
        .fetch_all(connection)
        .await?;

        // users without any assigned task appear with a count of zero
        let user_stats = sqlx::query_as::<_, UserStat>(
            "SELECT u.username, COUNT(t.task_id) AS task_count FROM users u \
             LEFT JOIN tasks t ON u.user_id = t.assigned_to_id \
             GROUP BY u.user_id, u.username \
             ORDER BY task_count DESC, u.username",
        )
        .fetch_all(connection)
        .await?;

        let overdue_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tasks WHERE due_date < date('now') AND status != 'Done'",
        )
        .fetch_one(connection)
        .await?;

        let (total, done) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COUNT(CASE WHEN status = 'Done' THEN 1 END) FROM tasks",
        )
        .fetch_one(connection)
        .await?;
        // defined as zero for an empty task set
        let completion_rate = if total == 0 {
            0.0
        } else {
            done as f64 / total as f64 * 100.0
        };

        Ok(Self {
            status_stats,
            priority_stats,
            tasks_over_time,
            user_stats,
            overdue_count,
            completion_rate,
        })
    }
}
