fn main() {
    medcite_lib::run()
}
