//! Metronome Arena MCP Server
//!
//! A Model Context Protocol server (rmcp, stdio transport) that lets an LLM
//! play finger-wag battles and manage the saved progression. Action tools
//! wait until the battle needs the player again and return every narration
//! line produced on the way.

use std::borrow::Cow;
use std::str::FromStr;
use std::sync::Arc;

use metronome_arena::battle::scheduler::TimerTicket;
use metronome_arena::config::ArenaConfig;
use metronome_arena::errors::ArenaError;
use metronome_arena::logging;
use metronome_arena::mcp_interface::*;
use metronome_arena::{CoinSide, Difficulty};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ErrorData as McpError, *},
    schemars, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::Deserialize;
use tokio::io::{stdin, stdout};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::{Mutex, Notify};
use tracing::{info, warn};

#[derive(Clone)]
pub struct MetronomeArenaService {
    tool_router: ToolRouter<MetronomeArenaService>,
    arena: Arc<Mutex<Arena>>,
    /// Woken after every fired timer.
    settled: Arc<Notify>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct StartBattleRequest {
    #[schemars(description = "Difficulty: 'easy', 'medium' or 'hard'")]
    pub difficulty: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GuessCoinRequest {
    #[schemars(description = "Coin face to call: 'heads' or 'tails'")]
    pub guess: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PullMovesRequest {
    #[schemars(description = "Number of draws, usually 1 or 10. Each costs 30 coins")]
    pub count: u32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpgradeMoveRequest {
    #[schemars(description = "Name of the owned move to upgrade with five copies")]
    pub move_name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateDeckRequest {
    #[schemars(description = "Up to six owned move names; must include 튀어오르기")]
    pub moves: Vec<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LookupMoveRequest {
    #[schemars(description = "Name of the move to look up")]
    pub move_name: String,
}

fn text_result(text: impl Into<String>) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(text.into())]))
}

fn error_text(err: &ArenaError) -> String {
    format!("Error: {}", err)
}

impl MetronomeArenaService {
    /// Feeds fired timer tickets back into the arena until the scheduler is gone.
    async fn drive_timers(self, mut tickets: UnboundedReceiver<TimerTicket>) {
        while let Some(ticket) = tickets.recv().await {
            if let Err(err) = self.arena.lock().await.fire(ticket) {
                warn!(%err, ?ticket, "timer could not advance the battle");
            }
            self.settled.notify_waiters();
        }
    }

    /// Waits for the pending timers to run out, collecting narration.
    async fn settle(&self, mut lines: Vec<String>) -> String {
        loop {
            let notified = self.settled.notified();
            {
                let mut arena = self.arena.lock().await;
                lines.extend(arena.take_new_lines());
                if arena.is_settled() {
                    lines.retain(|line| !line.is_empty());
                    return lines.join("\n");
                }
            }
            notified.await;
        }
    }
}

#[tool_router]
impl MetronomeArenaService {
    pub fn new(arena: Arena) -> Self {
        Self {
            tool_router: Self::tool_router(),
            arena: Arc::new(Mutex::new(arena)),
            settled: Arc::new(Notify::new()),
        }
    }

    #[tool(description = "Start a new finger-wag battle against the CPU Togepi")]
    async fn start_battle(
        &self,
        Parameters(request): Parameters<StartBattleRequest>,
    ) -> Result<CallToolResult, McpError> {
        let difficulty = Difficulty::from_str(request.difficulty.trim()).map_err(|_| McpError {
            code: ErrorCode(-32602),
            message: Cow::from(format!(
                "Unknown difficulty '{}'. Use easy, medium or hard",
                request.difficulty
            )),
            data: None,
        })?;
        let text = match self.arena.lock().await.start_battle(difficulty) {
            Ok(intro) => format!("{}\n동전의 면을 맞춰보세요: guess_coin (heads/tails)", intro),
            Err(err) => error_text(&err),
        };
        text_result(text)
    }

    #[tool(description = "Call the coin toss. A correct call means the player moves first")]
    async fn guess_coin(
        &self,
        Parameters(request): Parameters<GuessCoinRequest>,
    ) -> Result<CallToolResult, McpError> {
        let guess = CoinSide::from_str(request.guess.trim()).map_err(|_| McpError {
            code: ErrorCode(-32602),
            message: Cow::from(format!("Unknown coin face '{}'. Use heads or tails", request.guess)),
            data: None,
        })?;
        let outcome = self.arena.lock().await.guess_coin(guess);
        let text = match outcome {
            Ok(lines) => self.settle(vec![lines]).await,
            Err(err) => error_text(&err),
        };
        text_result(text)
    }

    #[tool(description = "Use 손가락흔들기: a random move from your deck is drawn and used")]
    async fn finger_wag(&self) -> Result<CallToolResult, McpError> {
        let outcome = self.arena.lock().await.finger_wag();
        let text = match outcome {
            Ok(lines) => self.settle(vec![lines]).await,
            Err(err) => error_text(&err),
        };
        text_result(text)
    }

    #[tool(description = "Get the current battle state as text and as JSON")]
    async fn get_battle_state(&self) -> Result<CallToolResult, McpError> {
        let arena = self.arena.lock().await;
        let snapshot = arena.snapshot();
        let json = serde_json::to_string_pretty(&snapshot).map_err(|err| McpError {
            code: ErrorCode(-32603),
            message: Cow::from(format!("Error serializing battle state: {}", err)),
            data: None,
        })?;
        Ok(CallToolResult::success(vec![
            Content::text(display_battle_status(&snapshot)),
            Content::text(json),
        ]))
    }

    #[tool(description = "Leave the current battle without a reward")]
    async fn leave_battle(&self) -> Result<CallToolResult, McpError> {
        let text = self.arena.lock().await.leave_battle();
        text_result(text)
    }

    #[tool(description = "Show coins, deck and owned moves with their upgrade levels")]
    async fn get_progress(&self) -> Result<CallToolResult, McpError> {
        let text = match self.arena.lock().await.progress() {
            Ok(text) => text,
            Err(err) => error_text(&err),
        };
        text_result(text)
    }

    #[tool(description = "Spend coins to draw random moves into the inventory")]
    async fn pull_moves(
        &self,
        Parameters(request): Parameters<PullMovesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = match self.arena.lock().await.pull_moves(request.count) {
            Ok(text) => text,
            Err(err) => error_text(&err),
        };
        text_result(text)
    }

    #[tool(description = "Consume five copies of a move to raise its level (max 5)")]
    async fn upgrade_move(
        &self,
        Parameters(request): Parameters<UpgradeMoveRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = match self.arena.lock().await.upgrade_move(request.move_name.trim()) {
            Ok(text) => text,
            Err(err) => error_text(&err),
        };
        text_result(text)
    }

    #[tool(description = "Replace the battle deck")]
    async fn update_deck(
        &self,
        Parameters(request): Parameters<UpdateDeckRequest>,
    ) -> Result<CallToolResult, McpError> {
        let names: Vec<&str> = request.moves.iter().map(|name| name.trim()).collect();
        let text = match self.arena.lock().await.update_deck(&names) {
            Ok(text) => text,
            Err(err) => error_text(&err),
        };
        text_result(text)
    }

    #[tool(description = "Show the draw probability of every move in the shop")]
    async fn move_odds(&self) -> Result<CallToolResult, McpError> {
        let text = self.arena.lock().await.move_odds();
        text_result(text)
    }

    #[tool(description = "Look up detailed information about a move")]
    async fn lookup_move(
        &self,
        Parameters(request): Parameters<LookupMoveRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = match handle_lookup_move_command(&request.move_name) {
            Ok(text) => text,
            Err(err) => error_text(&err),
        };
        text_result(text)
    }
}

#[tool_handler]
impl ServerHandler for MetronomeArenaService {}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init("info");
    eprintln!("Metronome Arena MCP Server starting...");

    let config = ArenaConfig::load_or_default(&ArenaConfig::path_from_env());
    let (arena, tickets) = Arena::open(&config)?;
    let service = MetronomeArenaService::new(arena);
    tokio::spawn(service.clone().drive_timers(tickets));

    let transport = (stdin(), stdout());
    eprintln!("Starting MCP server with transport...");
    let server = service.serve(transport).await?;

    info!("server running");
    let quit_reason = server.waiting().await?;

    eprintln!("Metronome Arena MCP Server exiting: {:?}", quit_reason);
    Ok(())
}
