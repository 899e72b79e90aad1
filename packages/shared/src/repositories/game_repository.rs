use crate::config::GameTableConfig;
use crate::models::game::{Cell, GameRecord, Marker, Phase, StatusDate};
use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use async_trait::async_trait;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::{AttributeValue, TableStatus};
use aws_sdk_dynamodb::Client;
use serde_dynamo::{from_item, to_item};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

#[cfg(test)]
use mockall::automock;

const GAME_ID_ATTRIBUTE: &str = "GameId";
const STATUS_DATE_ATTRIBUTE: &str = "StatusDate";
const TURN_ATTRIBUTE: &str = "Turn";

/// A single attribute write applied by a conditional update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    StatusDate(StatusDate),
    Turn(String),
    Cell(Cell, Marker),
}

impl FieldUpdate {
    pub fn attribute_name(&self) -> &'static str {
        match self {
            FieldUpdate::StatusDate(_) => STATUS_DATE_ATTRIBUTE,
            FieldUpdate::Turn(_) => TURN_ATTRIBUTE,
            FieldUpdate::Cell(cell, _) => cell.attribute_name(),
        }
    }

    pub fn value(&self) -> &str {
        match self {
            FieldUpdate::StatusDate(status_date) => status_date.as_str(),
            FieldUpdate::Turn(player_id) => player_id,
            FieldUpdate::Cell(_, marker) => marker.as_str(),
        }
    }

    pub fn apply_to(&self, game: &mut GameRecord) {
        match self {
            FieldUpdate::StatusDate(status_date) => game.status_date = status_date.clone(),
            FieldUpdate::Turn(player_id) => game.turn = player_id.clone(),
            FieldUpdate::Cell(cell, marker) => *game.cell_mut(*cell) = Some(*marker),
        }
    }
}

/// One precondition on the stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `StatusDate` begins with the phase prefix.
    InPhase(Phase),
    TurnIs(String),
    CellEmpty(Cell),
}

impl Condition {
    pub fn holds(&self, game: &GameRecord) -> bool {
        match self {
            Condition::InPhase(phase) => game.status_date.has_prefix(phase.prefix()),
            Condition::TurnIs(player_id) => game.turn == *player_id,
            Condition::CellEmpty(cell) => game.cell(*cell).is_none(),
        }
    }
}

/// Conjunction of conditions checked atomically with the write it guards.
/// A missing record never satisfies a non-empty guard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Guard {
    conditions: Vec<Condition>,
}

impl Guard {
    pub fn new() -> Self {
        Guard::default()
    }

    pub fn in_phase(phase: Phase) -> Self {
        Guard::new().and(Condition::InPhase(phase))
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn holds(&self, game: Option<&GameRecord>) -> bool {
        match game {
            Some(game) => self.conditions.iter().all(|condition| condition.holds(game)),
            None => self.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    GuardFailed,
}

/// Secondary indexes keyed by player and sorted by `StatusDate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameIndex {
    Host,
    Opponent,
}

impl GameIndex {
    pub fn key_attribute(&self) -> &'static str {
        match self {
            GameIndex::Host => "HostId",
            GameIndex::Opponent => "OpponentId",
        }
    }

    pub fn matches(&self, game: &GameRecord, user_id: &str) -> bool {
        match self {
            GameIndex::Host => game.host_id == user_id,
            GameIndex::Opponent => game.opponent_id == user_id,
        }
    }
}

/// Pull-based, single-pass sequence of games, newest first.
#[async_trait]
pub trait GameCursor: Send {
    async fn next_game(&mut self) -> Result<Option<GameRecord>, GameRepositoryError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait GameRepository: Send + Sync {
    /// Unconditional write of the whole record.
    async fn put_game(&self, game: &GameRecord) -> Result<(), GameRepositoryError>;

    /// Writes a record whose `GameId` is not taken yet. An existing record
    /// is left alone and reported as `GuardFailed`.
    async fn put_new_game(&self, game: &GameRecord) -> Result<WriteOutcome, GameRepositoryError>;

    async fn get_game(&self, game_id: &str) -> Result<Option<GameRecord>, GameRepositoryError>;

    async fn conditional_update(
        &self,
        game_id: &str,
        updates: &[FieldUpdate],
        guard: &Guard,
    ) -> Result<WriteOutcome, GameRepositoryError>;

    async fn conditional_delete(
        &self,
        game_id: &str,
        guard: &Guard,
    ) -> Result<WriteOutcome, GameRepositoryError>;

    /// Games on `index` for `user_id` whose `StatusDate` starts with
    /// `status_prefix`, newest first, at most `limit` of them.
    async fn query(
        &self,
        index: GameIndex,
        user_id: &str,
        status_prefix: &str,
        limit: usize,
    ) -> Result<Box<dyn GameCursor>, GameRepositoryError>;

    async fn is_table_active(&self) -> Result<bool, GameRepositoryError>;
}

pub struct DynamoDbGameRepository {
    pub client: Client,
    pub table_name: String,
    pub host_index: String,
    pub opponent_index: String,
    pub page_size: usize,
}

impl DynamoDbGameRepository {
    pub fn new(client: Client, config: &GameTableConfig) -> Self {
        Self {
            client,
            table_name: config.table_name.clone(),
            host_index: config.host_index.clone(),
            opponent_index: config.opponent_index.clone(),
            page_size: config.query_page_size,
        }
    }

    fn index_name(&self, index: GameIndex) -> &str {
        match index {
            GameIndex::Host => &self.host_index,
            GameIndex::Opponent => &self.opponent_index,
        }
    }
}

/// Placeholder maps shared by a condition and an update expression.
#[derive(Debug, Default)]
pub(crate) struct ExpressionAttributes {
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

impl ExpressionAttributes {
    fn name(&mut self, placeholder: String, attribute: &str) -> String {
        self.names.insert(placeholder.clone(), attribute.to_string());
        placeholder
    }

    fn value(&mut self, placeholder: String, value: &str) -> String {
        self.values
            .insert(placeholder.clone(), AttributeValue::S(value.to_string()));
        placeholder
    }

    fn names_or_none(&self) -> Option<HashMap<String, String>> {
        (!self.names.is_empty()).then(|| self.names.clone())
    }

    fn values_or_none(&self) -> Option<HashMap<String, AttributeValue>> {
        (!self.values.is_empty()).then(|| self.values.clone())
    }
}

pub(crate) fn condition_expression(
    guard: &Guard,
    attributes: &mut ExpressionAttributes,
) -> Option<String> {
    if guard.is_empty() {
        return None;
    }
    let clauses: Vec<String> = guard
        .conditions()
        .iter()
        .enumerate()
        .map(|(i, condition)| match condition {
            Condition::InPhase(phase) => {
                let name = attributes.name(format!("#c{}", i), STATUS_DATE_ATTRIBUTE);
                let value = attributes.value(format!(":c{}", i), phase.prefix());
                format!("begins_with({}, {})", name, value)
            }
            Condition::TurnIs(player_id) => {
                let name = attributes.name(format!("#c{}", i), TURN_ATTRIBUTE);
                let value = attributes.value(format!(":c{}", i), player_id);
                format!("{} = {}", name, value)
            }
            Condition::CellEmpty(cell) => {
                let name = attributes.name(format!("#c{}", i), cell.attribute_name());
                format!("attribute_not_exists({})", name)
            }
        })
        .collect();
    Some(clauses.join(" AND "))
}

pub(crate) fn update_expression(
    updates: &[FieldUpdate],
    attributes: &mut ExpressionAttributes,
) -> String {
    let assignments: Vec<String> = updates
        .iter()
        .enumerate()
        .map(|(i, update)| {
            let name = attributes.name(format!("#u{}", i), update.attribute_name());
            let value = attributes.value(format!(":u{}", i), update.value());
            format!("{} = {}", name, value)
        })
        .collect();
    format!("SET {}", assignments.join(", "))
}

pub type Item = HashMap<String, AttributeValue>;

/// Service errors the games table can answer with.
pub(crate) trait TableServiceError: std::error::Error + 'static {
    fn is_missing_table(&self) -> bool;

    /// The request's condition expression evaluated to false.
    fn is_guard_failure(&self) -> bool {
        false
    }
}

impl TableServiceError for PutItemError {
    fn is_missing_table(&self) -> bool {
        self.is_resource_not_found_exception()
    }

    fn is_guard_failure(&self) -> bool {
        self.is_conditional_check_failed_exception()
    }
}

impl TableServiceError for UpdateItemError {
    fn is_missing_table(&self) -> bool {
        self.is_resource_not_found_exception()
    }

    fn is_guard_failure(&self) -> bool {
        self.is_conditional_check_failed_exception()
    }
}

impl TableServiceError for DeleteItemError {
    fn is_missing_table(&self) -> bool {
        self.is_resource_not_found_exception()
    }

    fn is_guard_failure(&self) -> bool {
        self.is_conditional_check_failed_exception()
    }
}

impl TableServiceError for GetItemError {
    fn is_missing_table(&self) -> bool {
        self.is_resource_not_found_exception()
    }
}

impl TableServiceError for QueryError {
    fn is_missing_table(&self) -> bool {
        self.is_resource_not_found_exception()
    }
}

impl TableServiceError for DescribeTableError {
    fn is_missing_table(&self) -> bool {
        self.is_resource_not_found_exception()
    }
}

fn not_ready(table_name: &str) -> GameRepositoryError {
    GameRepositoryError::ResourceNotReady(format!("table {} is not available", table_name))
}

/// A missing table is `ResourceNotReady`; anything else is a transport failure.
pub(crate) fn classify_error<E, R>(err: &SdkError<E, R>, table_name: &str) -> GameRepositoryError
where
    E: TableServiceError,
    R: std::fmt::Debug,
{
    match err.as_service_error() {
        Some(service_err) if service_err.is_missing_table() => not_ready(table_name),
        _ => GameRepositoryError::Transport(format!("{}", DisplayErrorContext(err))),
    }
}

/// Like `classify_error`, except a failed condition is a normal outcome.
pub(crate) fn classify_write_error<E, R>(
    err: &SdkError<E, R>,
    table_name: &str,
) -> Result<WriteOutcome, GameRepositoryError>
where
    E: TableServiceError,
    R: std::fmt::Debug,
{
    match err.as_service_error() {
        Some(service_err) if service_err.is_guard_failure() => Ok(WriteOutcome::GuardFailed),
        _ => Err(classify_error(err, table_name)),
    }
}

#[async_trait]
impl GameRepository for DynamoDbGameRepository {
    async fn put_game(&self, game: &GameRecord) -> Result<(), GameRepositoryError> {
        let item = to_item(game).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map(|_| ())
            .map_err(|e| classify_error(&e, &self.table_name))
    }

    async fn put_new_game(&self, game: &GameRecord) -> Result<WriteOutcome, GameRepositoryError> {
        let item = to_item(game).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;

        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(#id)")
            .expression_attribute_names("#id", GAME_ID_ATTRIBUTE)
            .send()
            .await;

        match result {
            Ok(_) => Ok(WriteOutcome::Applied),
            Err(e) => {
                let outcome = classify_write_error(&e, &self.table_name)?;
                debug!("Game {} already exists", game.game_id);
                Ok(outcome)
            }
        }
    }

    async fn get_game(&self, game_id: &str) -> Result<Option<GameRecord>, GameRepositoryError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(GAME_ID_ATTRIBUTE, AttributeValue::S(game_id.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| classify_error(&e, &self.table_name))?;

        match output.item {
            Some(item) => {
                let game: GameRecord = from_item(item)
                    .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
                Ok(Some(game))
            }
            None => Ok(None),
        }
    }

    async fn conditional_update(
        &self,
        game_id: &str,
        updates: &[FieldUpdate],
        guard: &Guard,
    ) -> Result<WriteOutcome, GameRepositoryError> {
        let mut attributes = ExpressionAttributes::default();
        let update = update_expression(updates, &mut attributes);
        let condition = condition_expression(guard, &mut attributes);

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(GAME_ID_ATTRIBUTE, AttributeValue::S(game_id.to_string()))
            .update_expression(update)
            .set_condition_expression(condition)
            .set_expression_attribute_names(attributes.names_or_none())
            .set_expression_attribute_values(attributes.values_or_none())
            .send()
            .await;

        match result {
            Ok(_) => Ok(WriteOutcome::Applied),
            Err(e) => {
                let outcome = classify_write_error(&e, &self.table_name)?;
                debug!("Conditional update on game {} failed its guard", game_id);
                Ok(outcome)
            }
        }
    }

    async fn conditional_delete(
        &self,
        game_id: &str,
        guard: &Guard,
    ) -> Result<WriteOutcome, GameRepositoryError> {
        let mut attributes = ExpressionAttributes::default();
        let condition = condition_expression(guard, &mut attributes);

        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key(GAME_ID_ATTRIBUTE, AttributeValue::S(game_id.to_string()))
            .set_condition_expression(condition)
            .set_expression_attribute_names(attributes.names_or_none())
            .set_expression_attribute_values(attributes.values_or_none())
            .send()
            .await;

        match result {
            Ok(_) => Ok(WriteOutcome::Applied),
            Err(e) => {
                let outcome = classify_write_error(&e, &self.table_name)?;
                debug!("Conditional delete on game {} failed its guard", game_id);
                Ok(outcome)
            }
        }
    }

    async fn query(
        &self,
        index: GameIndex,
        user_id: &str,
        status_prefix: &str,
        limit: usize,
    ) -> Result<Box<dyn GameCursor>, GameRepositoryError> {
        let source = IndexQuery {
            client: self.client.clone(),
            table_name: self.table_name.clone(),
            index_name: self.index_name(index).to_string(),
            key_attribute: index.key_attribute(),
            user_id: user_id.to_string(),
            status_prefix: status_prefix.to_string(),
        };
        Ok(Box::new(PagedGameCursor::new(source, self.page_size, limit)))
    }

    async fn is_table_active(&self) -> Result<bool, GameRepositoryError> {
        match self
            .client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
        {
            Ok(output) => Ok(output
                .table()
                .and_then(|table| table.table_status())
                .is_some_and(|status| *status == TableStatus::Active)),
            Err(e) => match e.as_service_error() {
                Some(service_err) if service_err.is_missing_table() => Ok(false),
                _ => Err(classify_error(&e, &self.table_name)),
            },
        }
    }
}

/// One page of index query results.
#[derive(Debug, Default)]
pub struct QueryPage {
    pub items: Vec<Item>,
    pub last_evaluated_key: Option<Item>,
}

/// Fetches query pages on demand. Paging state lives in the cursor.
#[async_trait]
pub trait PageSource: Send {
    async fn fetch_page(
        &mut self,
        limit: usize,
        exclusive_start_key: Option<Item>,
    ) -> Result<QueryPage, GameRepositoryError>;
}

/// Descending query on one of the per-user `StatusDate` indexes.
pub struct IndexQuery {
    client: Client,
    table_name: String,
    index_name: String,
    key_attribute: &'static str,
    user_id: String,
    status_prefix: String,
}

#[async_trait]
impl PageSource for IndexQuery {
    async fn fetch_page(
        &mut self,
        limit: usize,
        exclusive_start_key: Option<Item>,
    ) -> Result<QueryPage, GameRepositoryError> {
        let output = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(&self.index_name)
            .key_condition_expression("#pk = :pk AND begins_with(#sk, :prefix)")
            .expression_attribute_names("#pk", self.key_attribute)
            .expression_attribute_names("#sk", STATUS_DATE_ATTRIBUTE)
            .expression_attribute_values(":pk", AttributeValue::S(self.user_id.clone()))
            .expression_attribute_values(
                ":prefix",
                AttributeValue::S(self.status_prefix.clone()),
            )
            .scan_index_forward(false)
            .limit(i32::try_from(limit).unwrap_or(i32::MAX))
            .set_exclusive_start_key(exclusive_start_key)
            .send()
            .await
            .map_err(|e| classify_error(&e, &self.table_name))?;

        debug!(
            "Fetched {} games from {} for {}",
            output.items().len(),
            self.index_name,
            self.user_id
        );
        Ok(QueryPage {
            items: output.items.unwrap_or_default(),
            last_evaluated_key: output.last_evaluated_key,
        })
    }
}

/// Walks a paged query, fetching the next page only once the buffered one is
/// drained and never asking for more than the games still wanted.
pub struct PagedGameCursor<S> {
    source: S,
    page_size: usize,
    remaining: usize,
    buffer: VecDeque<GameRecord>,
    exclusive_start_key: Option<Item>,
    exhausted: bool,
}

impl<S: PageSource> PagedGameCursor<S> {
    pub fn new(source: S, page_size: usize, limit: usize) -> Self {
        PagedGameCursor {
            source,
            page_size: page_size.max(1),
            remaining: limit,
            buffer: VecDeque::new(),
            exclusive_start_key: None,
            exhausted: false,
        }
    }

    async fn fill_buffer(&mut self) -> Result<(), GameRepositoryError> {
        let page_limit = self.page_size.min(self.remaining);
        let page = match self
            .source
            .fetch_page(page_limit, self.exclusive_start_key.take())
            .await
        {
            Ok(page) => page,
            Err(e) => {
                self.exhausted = true;
                return Err(e);
            }
        };

        for item in page.items {
            let game: GameRecord =
                from_item(item).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
            self.buffer.push_back(game);
        }

        self.exclusive_start_key = page.last_evaluated_key;
        self.exhausted = self.exclusive_start_key.is_none();
        Ok(())
    }
}

#[async_trait]
impl<S: PageSource> GameCursor for PagedGameCursor<S> {
    async fn next_game(&mut self) -> Result<Option<GameRecord>, GameRepositoryError> {
        if self.remaining == 0 {
            return Ok(None);
        }
        while self.buffer.is_empty() {
            if self.exhausted {
                return Ok(None);
            }
            self.fill_buffer().await?;
        }
        self.remaining -= 1;
        Ok(self.buffer.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::types::error::{
        ConditionalCheckFailedException, ProvisionedThroughputExceededException,
        ResourceNotFoundException,
    };
    use std::sync::{Arc, Mutex};

    fn in_progress_game() -> GameRecord {
        let mut game = GameRecord::new_invite("game-1", "alice", "bob", "t0");
        game.status_date = StatusDate::new(Phase::InProgress, "t1");
        game
    }

    #[test]
    fn test_move_guard_renders_three_clauses() {
        let guard = Guard::in_phase(Phase::InProgress)
            .and(Condition::TurnIs("bob".to_string()))
            .and(Condition::CellEmpty(Cell::TopLeft));
        let mut attributes = ExpressionAttributes::default();

        let expression = condition_expression(&guard, &mut attributes).unwrap();

        assert_eq!(
            expression,
            "begins_with(#c0, :c0) AND #c1 = :c1 AND attribute_not_exists(#c2)"
        );
        assert_eq!(attributes.names["#c0"], "StatusDate");
        assert_eq!(attributes.names["#c1"], "Turn");
        assert_eq!(attributes.names["#c2"], "TopLeft");
        assert_eq!(
            attributes.values[":c0"],
            AttributeValue::S("IN_PROGRESS_".to_string())
        );
        assert_eq!(attributes.values[":c1"], AttributeValue::S("bob".to_string()));
        assert!(!attributes.values.contains_key(":c2"));
    }

    #[test]
    fn test_empty_guard_renders_no_condition() {
        let mut attributes = ExpressionAttributes::default();
        assert!(condition_expression(&Guard::new(), &mut attributes).is_none());
        assert!(attributes.names_or_none().is_none());
        assert!(attributes.values_or_none().is_none());
    }

    #[test]
    fn test_update_expression_sets_every_field() {
        let updates = [
            FieldUpdate::Cell(Cell::MiddleMiddle, Marker::X),
            FieldUpdate::Turn("alice".to_string()),
        ];
        let mut attributes = ExpressionAttributes::default();

        let expression = update_expression(&updates, &mut attributes);

        assert_eq!(expression, "SET #u0 = :u0, #u1 = :u1");
        assert_eq!(attributes.names["#u0"], "MiddleMiddle");
        assert_eq!(attributes.values[":u0"], AttributeValue::S("X".to_string()));
        assert_eq!(attributes.names["#u1"], "Turn");
        assert_eq!(attributes.values[":u1"], AttributeValue::S("alice".to_string()));
    }

    #[test]
    fn test_guard_evaluation_against_record() {
        let game = in_progress_game();

        assert!(Guard::in_phase(Phase::InProgress).holds(Some(&game)));
        assert!(!Guard::in_phase(Phase::Pending).holds(Some(&game)));
        assert!(Guard::in_phase(Phase::InProgress)
            .and(Condition::TurnIs("bob".to_string()))
            .holds(Some(&game)));
        assert!(!Guard::new()
            .and(Condition::TurnIs("alice".to_string()))
            .holds(Some(&game)));
        assert!(!Guard::in_phase(Phase::InProgress).holds(None));
        assert!(Guard::new().holds(None));
    }

    #[test]
    fn test_cell_condition_fails_once_written() {
        let mut game = in_progress_game();
        let condition = Condition::CellEmpty(Cell::BottomRight);
        assert!(condition.holds(&game));

        FieldUpdate::Cell(Cell::BottomRight, Marker::O).apply_to(&mut game);

        assert!(!condition.holds(&game));
    }

    #[test]
    fn test_index_key_attributes() {
        let game = in_progress_game();
        assert_eq!(GameIndex::Host.key_attribute(), "HostId");
        assert_eq!(GameIndex::Opponent.key_attribute(), "OpponentId");
        assert!(GameIndex::Host.matches(&game, "alice"));
        assert!(!GameIndex::Host.matches(&game, "bob"));
        assert!(GameIndex::Opponent.matches(&game, "bob"));
    }

    #[test]
    fn test_failed_condition_is_a_guard_failure() {
        let err: SdkError<UpdateItemError, ()> = SdkError::service_error(
            UpdateItemError::ConditionalCheckFailedException(
                ConditionalCheckFailedException::builder()
                    .message("The conditional request failed")
                    .build(),
            ),
            (),
        );

        let outcome = classify_write_error(&err, "Games").unwrap();

        assert_eq!(outcome, WriteOutcome::GuardFailed);
    }

    #[test]
    fn test_put_on_taken_id_is_a_guard_failure() {
        let err: SdkError<PutItemError, ()> = SdkError::service_error(
            PutItemError::ConditionalCheckFailedException(
                ConditionalCheckFailedException::builder().build(),
            ),
            (),
        );

        assert_eq!(
            classify_write_error(&err, "Games").unwrap(),
            WriteOutcome::GuardFailed
        );
    }

    #[test]
    fn test_missing_table_is_resource_not_ready() {
        let err: SdkError<DeleteItemError, ()> = SdkError::service_error(
            DeleteItemError::ResourceNotFoundException(
                ResourceNotFoundException::builder()
                    .message("Requested resource not found")
                    .build(),
            ),
            (),
        );

        let result = classify_write_error(&err, "Games");

        assert!(matches!(
            result,
            Err(GameRepositoryError::ResourceNotReady(msg)) if msg.contains("Games")
        ));
    }

    #[test]
    fn test_other_service_errors_are_transport() {
        let err: SdkError<UpdateItemError, ()> = SdkError::service_error(
            UpdateItemError::ProvisionedThroughputExceededException(
                ProvisionedThroughputExceededException::builder().build(),
            ),
            (),
        );

        let result = classify_write_error(&err, "Games");

        assert!(matches!(result, Err(GameRepositoryError::Transport(_))));
    }

    #[test]
    fn test_timeout_is_transport_never_guard_failure() {
        let err: SdkError<UpdateItemError, ()> = SdkError::timeout_error("request timed out");

        let result = classify_write_error(&err, "Games");

        assert!(matches!(result, Err(GameRepositoryError::Transport(_))));
    }

    #[test]
    fn test_read_errors_classify_missing_table() {
        let missing: SdkError<QueryError, ()> = SdkError::service_error(
            QueryError::ResourceNotFoundException(ResourceNotFoundException::builder().build()),
            (),
        );
        let timeout: SdkError<GetItemError, ()> = SdkError::timeout_error("request timed out");

        assert!(matches!(
            classify_error(&missing, "Games"),
            GameRepositoryError::ResourceNotReady(_)
        ));
        assert!(matches!(
            classify_error(&timeout, "Games"),
            GameRepositoryError::Transport(_)
        ));
    }

    type PageRequests = Arc<Mutex<Vec<(usize, Option<Item>)>>>;

    /// Serves canned pages and records what the cursor asked for.
    struct ScriptedPages {
        pages: VecDeque<Result<QueryPage, GameRepositoryError>>,
        requests: PageRequests,
    }

    impl ScriptedPages {
        fn new(pages: Vec<Result<QueryPage, GameRepositoryError>>) -> (Self, PageRequests) {
            let requests = PageRequests::default();
            let source = ScriptedPages {
                pages: pages.into(),
                requests: requests.clone(),
            };
            (source, requests)
        }
    }

    #[async_trait]
    impl PageSource for ScriptedPages {
        async fn fetch_page(
            &mut self,
            limit: usize,
            exclusive_start_key: Option<Item>,
        ) -> Result<QueryPage, GameRepositoryError> {
            self.requests.lock().unwrap().push((limit, exclusive_start_key));
            self.pages.pop_front().unwrap_or_else(|| Ok(QueryPage::default()))
        }
    }

    fn page(ids: &[&str], last_key: Option<&str>) -> Result<QueryPage, GameRepositoryError> {
        let items = ids
            .iter()
            .map(|id| {
                let game = GameRecord::new_invite(id, "alice", "bob", "t0");
                let item: Item = to_item(&game).unwrap();
                item
            })
            .collect();
        Ok(QueryPage {
            items,
            last_evaluated_key: last_key.map(start_key),
        })
    }

    fn start_key(id: &str) -> Item {
        HashMap::from([(
            GAME_ID_ATTRIBUTE.to_string(),
            AttributeValue::S(id.to_string()),
        )])
    }

    async fn drain(cursor: &mut dyn GameCursor) -> Vec<String> {
        let mut ids = Vec::new();
        while let Some(game) = cursor.next_game().await.unwrap() {
            ids.push(game.game_id);
        }
        ids
    }

    #[tokio::test]
    async fn test_cursor_follows_last_evaluated_key() {
        let (source, requests) = ScriptedPages::new(vec![
            page(&["g0", "g1"], Some("g1")),
            page(&["g2"], None),
        ]);
        let mut cursor = PagedGameCursor::new(source, 2, 10);

        assert_eq!(drain(&mut cursor).await, vec!["g0", "g1", "g2"]);

        let requests = requests.lock().unwrap();
        assert_eq!(*requests, vec![(2, None), (2, Some(start_key("g1")))]);
    }

    #[tokio::test]
    async fn test_cursor_stops_at_limit() {
        let (source, requests) = ScriptedPages::new(vec![
            page(&["g0", "g1"], Some("g1")),
            page(&["g2"], Some("g2")),
            page(&["g3", "g4"], None),
        ]);
        let mut cursor = PagedGameCursor::new(source, 2, 3);

        assert_eq!(drain(&mut cursor).await, vec!["g0", "g1", "g2"]);

        // The last page only asks for what is still wanted, and nothing is
        // fetched once the limit is reached.
        let requests = requests.lock().unwrap();
        assert_eq!(*requests, vec![(2, None), (1, Some(start_key("g1")))]);
    }

    #[tokio::test]
    async fn test_cursor_skips_empty_pages_until_key_runs_out() {
        let (source, requests) =
            ScriptedPages::new(vec![page(&[], Some("g0")), page(&["g1"], None)]);
        let mut cursor = PagedGameCursor::new(source, 5, 5);

        assert_eq!(drain(&mut cursor).await, vec!["g1"]);
        assert_eq!(requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_cursor_error_ends_the_cursor() {
        let (source, requests) = ScriptedPages::new(vec![Err(
            GameRepositoryError::ResourceNotReady("table Games is not available".to_string()),
        )]);
        let mut cursor = PagedGameCursor::new(source, 5, 5);

        assert!(matches!(
            cursor.next_game().await,
            Err(GameRepositoryError::ResourceNotReady(_))
        ));
        assert_eq!(cursor.next_game().await.unwrap(), None);
        assert_eq!(requests.lock().unwrap().len(), 1);
    }
}
