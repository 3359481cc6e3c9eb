use quizhall::prelude::*;

const DEFAULT_ADDR: &str = "0.0.0.0:8080";

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

fn question(id: u32, text: &str, options: &[&str], correct_option: usize) -> Question {
    Question {
        id: QuestionId(id),
        text: text.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_option,
        // 0 → the engine's default time limit
        time_limit_secs: 0,
    }
}

fn seed_questions() -> Vec<Question> {
    vec![
        question(
            1,
            "Which gas do plants absorb from the air?",
            &["Oxygen", "Carbon dioxide", "Nitrogen", "Helium"],
            1,
        ),
        question(2, "How many bits are in a byte?", &["4", "16", "8", "2"], 2),
        question(
            3,
            "Which ocean is the largest?",
            &["Pacific", "Atlantic", "Indian", "Arctic"],
            0,
        ),
    ]
}

async fn build_server(addr: &str) -> Result<QuizServer<SessionStore, JsonCodec>, QuizhallError> {
    let server = QuizServer::<SessionStore, JsonCodec>::builder()
        .bind(addr)
        .build(SessionStore::new())
        .await?;

    let session = server.engine().create_session("Q1", seed_questions()).await;
    tracing::info!(
        session_id = %session.id(),
        questions = session.questions().len(),
        "session seeded"
    );
    Ok(server)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let addr = std::env::var("QUIZHALL_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let server = build_server(&addr).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message;

    #[test]
    fn test_seed_questions_have_valid_correct_options() {
        for q in seed_questions() {
            assert!(q.correct_option < q.options.len(), "{} has no correct option", q.id);
        }
    }

    type Ws = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn next(ws: &mut Ws) -> serde_json::Value {
        let msg = ws.next().await.unwrap().unwrap();
        serde_json::from_slice(&msg.into_data()).unwrap()
    }

    #[tokio::test]
    async fn test_seeded_session_accepts_join_and_answer() {
        let server = build_server("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());

        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}")).await.unwrap();
        let join = r#"{"type":"join","payload":{"quizId":"Q1","userName":"ada"}}"#;
        ws.send(Message::Text(join.to_string().into())).await.unwrap();
        assert_eq!(next(&mut ws).await["type"], "joined");
        assert_eq!(next(&mut ws).await["type"], "leaderboard");

        let answer = r#"{"type":"answer","payload":{"quizId":"Q1","userId":"ada","questionId":2,"answer":2}}"#;
        ws.send(Message::Text(answer.to_string().into())).await.unwrap();
        let result = next(&mut ws).await;
        assert_eq!(result["type"], "result");
        assert_eq!(result["payload"]["correct"], true);
        assert_eq!(result["payload"]["score"], 10);
    }
}
