fn main() {
    inventory_ingest_lib::run()
}
