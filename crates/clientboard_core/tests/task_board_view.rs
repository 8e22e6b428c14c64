use chrono::NaiveDate;
use clientboard_core::view::task_board::{flatten_tasks, list_assignees, project_tasks};
use clientboard_core::{
    AssigneeFilter, Client, ClientStatus, CompletionFilter, Task, TaskQuery,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

fn task(text: &str, completed: bool, due: Option<u32>, assignee: Option<&str>) -> Task {
    let mut task = Task::new(text);
    task.completed = completed;
    task.due_date = due.map(day);
    task.assignee = assignee.map(str::to_string);
    task
}

fn board() -> Vec<Client> {
    let mut acme = Client::new("Acme", ClientStatus::Active);
    acme.tasks = vec![
        task("send invoice", true, Some(3), Some("Kim")),
        task("call client", false, None, Some("Lee")),
        task("draft report", false, Some(20), None),
    ];
    let empty = Client::new("Empty", ClientStatus::Onboarding);
    let mut globex = Client::new("Globex", ClientStatus::Pending);
    globex.tasks = vec![
        task("review contract", false, Some(5), Some("Kim")),
        task("archive files", true, None, None),
    ];
    vec![acme, empty, globex]
}

fn texts(rows: &[clientboard_core::TaskRow]) -> Vec<&str> {
    rows.iter().map(|row| row.task.text.as_str()).collect()
}

#[test]
fn flatten_yields_one_row_per_task_with_its_owner() {
    let clients = board();
    let rows = flatten_tasks(&clients);

    let expected: usize = clients.iter().map(|client| client.tasks.len()).sum();
    assert_eq!(rows.len(), expected);
    for row in &rows {
        let owner = clients
            .iter()
            .find(|client| client.id == row.client_id)
            .unwrap();
        assert_eq!(row.client_name, owner.name);
        assert!(owner.tasks.contains(&row.task));
    }
}

#[test]
fn projection_orders_open_tasks_first_then_by_due_date() {
    let rows = project_tasks(&board(), &TaskQuery::default());

    assert_eq!(
        texts(&rows),
        [
            "review contract",
            "draft report",
            "call client",
            "send invoice",
            "archive files",
        ]
    );
    for pair in rows.windows(2) {
        let (a, b) = (&pair[0].task, &pair[1].task);
        assert!(!a.completed || b.completed);
        if a.completed == b.completed {
            if let Some(b_due) = b.due_date {
                assert!(a.due_date.is_some_and(|a_due| a_due <= b_due));
            }
        }
    }
}

#[test]
fn assignee_filter_selects_named_or_unassigned() {
    let clients = board();

    let kim = TaskQuery {
        assignee: AssigneeFilter::Named("Kim".to_string()),
        ..TaskQuery::default()
    };
    assert_eq!(
        texts(&project_tasks(&clients, &kim)),
        ["review contract", "send invoice"]
    );

    let unassigned = TaskQuery {
        assignee: AssigneeFilter::Unassigned,
        ..TaskQuery::default()
    };
    assert_eq!(
        texts(&project_tasks(&clients, &unassigned)),
        ["draft report", "archive files"]
    );
}

#[test]
fn completion_filter_and_search_combine() {
    let clients = board();

    let pending = TaskQuery {
        completion: CompletionFilter::Pending,
        ..TaskQuery::default()
    };
    assert!(project_tasks(&clients, &pending)
        .iter()
        .all(|row| !row.task.completed));

    let by_client_name = TaskQuery {
        search: "GLOBEX".to_string(),
        completion: CompletionFilter::Completed,
        ..TaskQuery::default()
    };
    assert_eq!(
        texts(&project_tasks(&clients, &by_client_name)),
        ["archive files"]
    );

    let by_text = TaskQuery {
        search: "report".to_string(),
        ..TaskQuery::default()
    };
    assert_eq!(texts(&project_tasks(&clients, &by_text)), ["draft report"]);
}

#[test]
fn assignee_list_is_distinct_and_sorted() {
    assert_eq!(list_assignees(&board()), ["Kim", "Lee"]);
}

#[test]
fn overdue_requires_open_task_with_past_due_date() {
    let today = day(10);

    assert!(task("late", false, Some(9), None).is_overdue(today));
    assert!(!task("done late", true, Some(9), None).is_overdue(today));
    assert!(!task("due today", false, Some(10), None).is_overdue(today));
    assert!(!task("undated", false, None, None).is_overdue(today));
}
