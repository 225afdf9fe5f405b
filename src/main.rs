#[actix_web::main]
async fn main() -> std::io::Result<()> {
    mailmerge_server::run().await
}
