use anyhow::{anyhow, Context, Result};
use colored::*;
use serde_json::{json, Value};
use std::io::{self, Write};

struct Session {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("{}", "⛴️ Tour Scheduling Testing Tool".bright_blue().bold());
    println!("{}", "=====================================".bright_blue());
    println!();

    let session = get_session()?;

    loop {
        println!();
        println!("{}", "📋 MENÚ PRINCIPAL".bright_green().bold());
        println!("{}", "==================".bright_green());
        println!("1. 🔍 Ver salidas disponibles de una fecha");
        println!("2. 💺 Ver asientos de una instancia");
        println!("3. 🏁 Carrera de reservas concurrentes");
        println!("4. 🚪 Salir");
        print!("{}", "Selecciona una opción (1-4): ".bright_yellow());
        io::stdout().flush()?;

        let choice = read_line()?;
        let result = match choice.as_str() {
            "1" => list_available(&session).await,
            "2" => show_seats(&session).await,
            "3" => booking_race(&session).await,
            "4" => {
                println!("{}", "👋 ¡Hasta luego!".bright_green());
                break;
            }
            _ => {
                println!("{}", "❌ Opción inválida. Intenta de nuevo.".bright_red());
                Ok(())
            }
        };

        if let Err(e) = result {
            println!("{} {:#}", "❌ Error:".bright_red().bold(), e);
        }
    }

    Ok(())
}

fn read_line() -> Result<String> {
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label.bright_yellow());
    io::stdout().flush()?;
    read_line()
}

fn get_session() -> Result<Session> {
    println!("{}", "🔐 CONEXIÓN AL SERVIDOR".bright_cyan().bold());
    println!("{}", "=======================".bright_cyan());

    let mut base_url = prompt("URL base (enter = http://localhost:8080): ")?;
    if base_url.is_empty() {
        base_url = "http://localhost:8080".to_string();
    }
    let token = prompt("Token JWT: ")?;
    if token.is_empty() {
        return Err(anyhow!("se requiere un token"));
    }

    Ok(Session {
        base_url: base_url.trim_end_matches('/').to_string(),
        token,
        client: reqwest::Client::new(),
    })
}

impl Session {
    async fn get(&self, path: &str) -> Result<(u16, Value)> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("GET {}", path))?;
        let status = response.status().as_u16();
        Ok((status, response.json().await.unwrap_or(Value::Null)))
    }

    async fn post(&self, path: &str, body: &Value) -> Result<(u16, Value)> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {}", path))?;
        let status = response.status().as_u16();
        Ok((status, response.json().await.unwrap_or(Value::Null)))
    }
}

async fn list_available(session: &Session) -> Result<()> {
    let date = prompt("Fecha (YYYY-MM-DD): ")?;
    let (status, body) = session
        .get(&format!("/api/occurrences/available?date={}", date))
        .await?;
    if status != 200 {
        println!("{} {}", format!("❌ HTTP {}", status).bright_red(), body);
        return Ok(());
    }

    let items = body["data"]["items"].as_array().cloned().unwrap_or_default();
    println!();
    println!("{}", format!("📅 {} salidas con asientos el {}", items.len(), date).bright_green());
    for item in items {
        println!(
            "  {}  {:>3}/{:<3} libres  plantilla {}",
            item["occurrence"]["id"].as_str().unwrap_or("?").bright_white(),
            item["seats"]["remaining"],
            item["seats"]["capacity"],
            item["template"]["id"].as_str().unwrap_or("?"),
        );
    }
    Ok(())
}

async fn show_seats(session: &Session) -> Result<()> {
    let occurrence_id = prompt("ID de la instancia: ")?;
    let (status, body) = session
        .get(&format!("/api/occurrences/{}/seats", occurrence_id))
        .await?;
    if status != 200 {
        println!("{} {}", format!("❌ HTTP {}", status).bright_red(), body);
        return Ok(());
    }

    let seats = &body["data"];
    println!();
    println!("{}", "💺 ASIENTOS".bright_blue().bold());
    println!("   Capacidad:  {}", seats["capacity"]);
    println!("   Vendidos:   {}", seats["sold"]);
    println!("   Libres:     {}", seats["remaining"].to_string().bright_green());
    Ok(())
}

/// Lanza N reservas a la vez contra la misma instancia y comprueba que no se
/// vendan más asientos de los que había
async fn booking_race(session: &Session) -> Result<()> {
    let occurrence_id = prompt("ID de la instancia: ")?;
    let requests: usize = prompt("Número de reservas simultáneas: ")?
        .parse()
        .context("número inválido")?;
    let passengers: i64 = prompt("Pasajeros por reserva: ")?
        .parse()
        .context("número inválido")?;

    let seats_path = format!("/api/occurrences/{}/seats", occurrence_id);
    let (_, before) = session.get(&seats_path).await?;
    let remaining_before = before["data"]["remaining"].as_i64().unwrap_or(0);

    println!();
    println!(
        "{}",
        format!("🏁 Lanzando {} reservas de {} pasajeros...", requests, passengers)
            .bright_cyan()
            .bold()
    );

    let book_path = format!("/api/occurrences/{}/bookings", occurrence_id);
    let attempts = (0..requests).map(|i| {
        let body = json!({
            "passengers": passengers,
            "client_reference": format!("race-{}", i),
        });
        let path = book_path.clone();
        async move { session.post(&path, &body).await }
    });
    let results = futures::future::join_all(attempts).await;

    let mut committed = 0;
    let mut exceeded = 0;
    let mut other = 0;
    for result in results {
        match result {
            Ok((200, _)) => committed += 1,
            Ok((409, body)) if body["code"] == "CAPACITY_EXCEEDED" => exceeded += 1,
            Ok((status, body)) => {
                other += 1;
                println!("   {} {}", format!("HTTP {}", status).bright_red(), body["code"]);
            }
            Err(e) => {
                other += 1;
                println!("   {} {:#}", "error".bright_red(), e);
            }
        }
    }

    let (_, after) = session.get(&seats_path).await?;
    let sold = after["data"]["sold"].as_i64().unwrap_or(0);
    let capacity = after["data"]["capacity"].as_i64().unwrap_or(0);

    println!();
    println!("{}", "📊 RESULTADO".bright_blue().bold());
    println!("   Confirmadas:       {}", committed.to_string().bright_green());
    println!("   Sin capacidad:     {}", exceeded.to_string().bright_yellow());
    println!("   Otros errores:     {}", other);
    println!("   Libres antes:      {}", remaining_before);
    println!("   Vendidos / cap.:   {} / {}", sold, capacity);

    let expected = (remaining_before / passengers.max(1)).min(requests as i64);
    if sold > capacity {
        println!("{}", "🚨 SOBREVENTA DETECTADA".bright_red().bold());
    } else if committed as i64 == expected {
        println!("{}", "✅ Sin sobreventa y sin rechazos de más".bright_green().bold());
    } else {
        println!(
            "{}",
            format!("⚠️ Se esperaban {} confirmadas", expected).bright_yellow()
        );
    }
    Ok(())
}
