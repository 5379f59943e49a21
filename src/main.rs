#[rocket::launch]
fn rocket() -> _ {
    anon_pair_chat::rocket()
}
