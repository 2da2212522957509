use super::{AgentStorage, Message, Session, ToolCall};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct SqliteAgentStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteAgentStorage {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Wraps `conn` after making sure the agent tables exist
    pub fn with_migrations(conn: Arc<Mutex<Connection>>) -> anyhow::Result<Self> {
        let storage = Self::new(conn);
        super::schema::run_migrations(&*storage.lock()?)
            .context("Failed to create agent session tables")?;
        Ok(storage)
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Agent storage connection lock poisoned"))
    }
}

#[async_trait]
impl AgentStorage for SqliteAgentStorage {
    async fn create_session(&self, session: Session) -> anyhow::Result<i64> {
        let conn = self.lock()?;
        let now = chrono::Utc::now().timestamp();

        conn.execute(
            "INSERT INTO agent_sessions
             (agent_name, model, user_prompt, config, status, started_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            rusqlite::params![
                session.agent_type,
                session.model,
                session.objective,
                session.context_data,
                session.status,
                now,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    async fn get_session(&self, session_id: i64) -> anyhow::Result<Option<Session>> {
        let conn = self.lock()?;

        let session = conn
            .query_row(
                "SELECT id, agent_name, model, user_prompt, config, status, result,
                        started_at, ended_at
                 FROM agent_sessions WHERE id = ?",
                [session_id],
                |row| {
                    Ok(Session {
                        id: Some(row.get(0)?),
                        agent_type: row.get(1)?,
                        model: row.get(2)?,
                        objective: row.get(3)?,
                        context_data: row.get(4)?,
                        status: row.get(5)?,
                        result: row.get(6)?,
                        started_at: row.get(7)?,
                        ended_at: row.get(8)?,
                    })
                },
            )
            .optional()?;

        Ok(session)
    }

    async fn finish_session(
        &self,
        session_id: i64,
        status: &str,
        result: Option<String>,
    ) -> anyhow::Result<()> {
        let conn = self.lock()?;
        let now = chrono::Utc::now().timestamp();

        let updated = conn.execute(
            "UPDATE agent_sessions
             SET status = ?, result = ?, ended_at = ?
             WHERE id = ?",
            rusqlite::params![
                status,
                result,
                if status == "completed" || status == "failed" {
                    Some(now)
                } else {
                    None
                },
                session_id,
            ],
        )?;

        if updated == 0 {
            return Err(anyhow!("No agent session with id {}", session_id));
        }
        Ok(())
    }

    async fn create_message(&self, message: Message) -> anyhow::Result<i64> {
        let conn = self.lock()?;
        let now = chrono::Utc::now().timestamp();

        conn.execute(
            "INSERT INTO agent_messages (session_id, role, content, created_at)
             VALUES (?, ?, ?, ?)",
            rusqlite::params![message.session_id, message.role, message.content, now],
        )?;

        Ok(conn.last_insert_rowid())
    }

    async fn get_messages(&self, session_id: i64) -> anyhow::Result<Vec<Message>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT id, session_id, role, content, created_at
             FROM agent_messages
             WHERE session_id = ?
             ORDER BY created_at ASC, id ASC",
        )?;

        let messages = stmt
            .query_map([session_id], |row| {
                Ok(Message {
                    id: Some(row.get(0)?),
                    session_id: row.get(1)?,
                    role: row.get(2)?,
                    content: row.get(3)?,
                    created_at: Some(row.get(4)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(messages)
    }

    async fn create_tool_call(&self, tool_call: ToolCall) -> anyhow::Result<i64> {
        let conn = self.lock()?;
        let now = chrono::Utc::now().timestamp();

        conn.execute(
            "INSERT INTO agent_tool_calls
             (session_id, tool_call_id, tool_name, request, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            rusqlite::params![
                tool_call.session_id,
                tool_call.tool_call_id,
                tool_call.tool_name,
                tool_call.tool_input,
                tool_call.status,
                now,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    async fn update_tool_call(&self, tool_call: ToolCall) -> anyhow::Result<()> {
        let id = tool_call
            .id
            .ok_or_else(|| anyhow!("Cannot update a tool call that was never stored"))?;
        let conn = self.lock()?;
        let now = chrono::Utc::now().timestamp();

        conn.execute(
            "UPDATE agent_tool_calls
             SET response = ?, status = ?, error_details = ?, completed_at = ?
             WHERE id = ?",
            rusqlite::params![
                tool_call.tool_output,
                tool_call.status,
                tool_call.error_message,
                now,
                id,
            ],
        )?;

        Ok(())
    }

    async fn get_tool_calls(&self, session_id: i64) -> anyhow::Result<Vec<ToolCall>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT id, session_id, tool_call_id, tool_name, request, response, status,
                    error_details
             FROM agent_tool_calls
             WHERE session_id = ?
             ORDER BY created_at ASC, id ASC",
        )?;

        let tool_calls = stmt
            .query_map([session_id], |row| {
                Ok(ToolCall {
                    id: Some(row.get(0)?),
                    session_id: row.get(1)?,
                    tool_call_id: row.get(2)?,
                    tool_name: row.get(3)?,
                    tool_input: row.get(4)?,
                    tool_output: row.get(5)?,
                    status: row.get(6)?,
                    error_message: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tool_calls)
    }
}
