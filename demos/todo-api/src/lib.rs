//! A small TODO API: one namespace, two resources, a form parser and
//! marshaled responses.

use indexmap::IndexMap;
use restplus::prelude::*;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct Todos {
    inner: Arc<RwLock<IndexMap<String, String>>>,
}

/// One past the highest `todoN` id, so deletions never lead to reuse.
fn next_id(todos: &IndexMap<String, String>) -> String {
    let last = todos
        .keys()
        .filter_map(|id| id.strip_prefix("todo")?.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("todo{}", last + 1)
}

impl Todos {
    pub fn seeded() -> Self {
        let todos: IndexMap<String, String> = [
            ("todo1", "build an API"),
            ("todo2", "?????"),
            ("todo3", "profit!"),
        ]
        .into_iter()
        .map(|(id, task)| (id.to_string(), task.to_string()))
        .collect();
        Self {
            inner: Arc::new(RwLock::new(todos)),
        }
    }

    async fn get(&self, id: &str) -> Result<String, ApiError> {
        self.inner
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| abort(404, format!("Todo {id} doesn't exist")))
    }
}

fn task_parser() -> RequestParser {
    RequestParser::new().arg(
        Argument::new("task")
            .location(Location::Form)
            .required()
            .help("The task details"),
    )
}

fn task_arg(call: &Call<Todos>) -> String {
    call.arg("task")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Build the API over `todos`.
pub fn build_api(todos: Todos) -> Result<Api<Todos>, SpecsError> {
    let todo = Model::builder("Todo")
        .field("task", Field::string().required().description("The task details"))
        .build()?;
    let listed_todo = Model::builder("ListedTodo")
        .field("id", Field::string().required().description("The todo ID"))
        .field("todo", Field::nested(&todo).description("The Todo"))
        .build()?;

    let item = Resource::new("Todo")
        .doc("Show a single todo item and lets you delete them")
        .param("todo_id", "The Todo ID")
        .response(404, "Todo not found", None)
        .get(
            Operation::new(|call: Call<Todos>| async move {
                let id = call.param("todo_id").unwrap_or_default().to_string();
                let task = call.state().get(&id).await?;
                Ok::<_, ApiError>(json!({ "task": task }))
            })
            .doc("Fetch a given resource")
            .description("todo_id should be in todo1, todo2, todo3")
            .marshal_with(&todo),
        )
        .delete(
            Operation::new(|call: Call<Todos>| async move {
                let id = call.param("todo_id").unwrap_or_default().to_string();
                call.state().get(&id).await?;
                call.state().inner.write().await.shift_remove(&id);
                tracing::info!(todo_id = %id, "Todo deleted");
                Ok::<_, ApiError>(Reply::no_content())
            })
            .doc("Delete a given resource")
            .response(204, "Todo deleted", None),
        )
        .put(
            Operation::new(|call: Call<Todos>| async move {
                let id = call.param("todo_id").unwrap_or_default().to_string();
                let task = task_arg(&call);
                call.state().inner.write().await.insert(id, task.clone());
                Ok::<_, ApiError>(json!({ "task": task }))
            })
            .doc("Update a given resource")
            .parser(task_parser())
            .marshal_with(&todo),
        );

    let list = Resource::new("TodoList")
        .doc("Shows a list of all todos, and lets you POST to add new tasks")
        .get(
            Operation::new(|call: Call<Todos>| async move {
                let todos = call.state().inner.read().await;
                let listed: Vec<Value> = todos
                    .iter()
                    .map(|(id, task)| json!({ "id": id, "todo": { "task": task } }))
                    .collect();
                Ok::<_, ApiError>(Value::Array(listed))
            })
            .doc("List all todos")
            .marshal_list_with(&listed_todo),
        )
        .post(
            Operation::new(|call: Call<Todos>| async move {
                let task = task_arg(&call);
                let mut todos = call.state().inner.write().await;
                let id = next_id(&todos);
                todos.insert(id.clone(), task.clone());
                tracing::info!(todo_id = %id, "Todo created");
                Ok::<_, ApiError>(json!({ "task": task }))
            })
            .doc("Create a todo")
            .parser(task_parser())
            .marshal_with(&todo)
            .code(201),
        );

    let ns = Namespace::new("todos")
        .description("TODO operations")
        .route("/<todo_id>", item)
        .route("/", list);

    Ok(Api::new(todos)
        .info(ApiInfo::new("Todo API", "1.0").description("A simple TODO API"))
        .namespace(ns))
}
