fn main() {
    blocklaunch_lib::run()
}
