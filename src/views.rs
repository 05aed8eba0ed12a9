//! Server-rendered pages. Every value coming from the store or the request
//! goes through `escape` before it lands in markup.

use std::fmt::Write;

use crate::db::DATE_FORMAT;
use crate::ledger::{EmployeeRef, JoinedPunch, PunchEvent};

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>
<html lang=\"pt-BR\">
<head><meta charset=\"utf-8\"><title>{}</title></head>
<body>
{}
</body>
</html>
",
        escape(title),
        body
    )
}

fn notice(message: Option<&str>, class: &str) -> String {
    match message {
        Some(m) => format!("<p class=\"{}\">{}</p>\n", class, escape(m)),
        None => String::new(),
    }
}

pub fn login_page(error: Option<&str>) -> String {
    let body = format!(
        "<h1>Ponto</h1>
{}<form method=\"post\" action=\"/\">
  <label>Nome <input name=\"name\" autofocus></label>
  <label>Senha <input name=\"secret\" type=\"password\"></label>
  <button type=\"submit\">Entrar</button>
</form>",
        notice(error, "error")
    );
    layout("Login", &body)
}

pub fn employee_page(name: &str, message: Option<&str>, events: &[PunchEvent]) -> String {
    let mut rows = String::new();
    for event in events {
        let _ = writeln!(
            rows,
            "<tr><td>{}</td><td>{}</td></tr>",
            event.timestamp.format(DATE_FORMAT),
            escape(&event.kind)
        );
    }

    let body = format!(
        "<h1>Olá, {}</h1>
{}<form method=\"post\" action=\"/funcionario\">
  <button name=\"kind\" value=\"entrada\">Entrada</button>
  <button name=\"kind\" value=\"saida\">Saída</button>
</form>
<h2>Últimos registros</h2>
<table>
<tr><th>Horário</th><th>Tipo</th></tr>
{}</table>
<p><a href=\"/logout\">Sair</a></p>",
        escape(name),
        notice(message, "message"),
        rows
    );
    layout("Funcionário", &body)
}

pub fn admin_page(
    punches: &[JoinedPunch],
    employees: &[EmployeeRef],
    message: Option<&str>,
) -> String {
    let mut options = String::new();
    for employee in employees {
        let _ = writeln!(
            options,
            "    <option value=\"{}\">{}</option>",
            employee.id,
            escape(&employee.name)
        );
    }

    let mut rows = String::new();
    for punch in punches {
        let _ = writeln!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&punch.account_name),
            punch.timestamp.format(DATE_FORMAT),
            escape(&punch.kind)
        );
    }

    let body = format!(
        "<h1>Administração</h1>
{}<h2>Novo funcionário</h2>
<form method=\"post\" action=\"/admin\">
  <input type=\"hidden\" name=\"action\" value=\"create\">
  <label>Nome <input name=\"name\"></label>
  <label>Senha <input name=\"secret\" type=\"password\"></label>
  <button type=\"submit\">Criar</button>
</form>
<h2>Registrar ponto</h2>
<form method=\"post\" action=\"/admin/add_time\">
  <select name=\"account_id\">
{}  </select>
  <select name=\"kind\">
    <option value=\"entrada\">Entrada</option>
    <option value=\"saida\">Saída</option>
  </select>
  <button type=\"submit\">Registrar</button>
</form>
<h2>Registros</h2>
<p><a href=\"/exportar\">Exportar CSV</a> | <a href=\"/logout\">Sair</a></p>
<table>
<tr><th>Funcionário</th><th>Horário</th><th>Tipo</th></tr>
{}</table>",
        notice(message, "message"),
        options,
        rows
    );
    layout("Administração", &body)
}
